//! Dashboard Controller
//!
//! Owns the application state and coordinates the render dispatcher, the
//! status poller and the tabs. Every full-page render goes through
//! [`Dashboard::render`]; user events arrive as [`Action`]s through the
//! dispatch callback handed to the surface.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::api::Backend;
use crate::config::Config;
use crate::dom::{Action, Dispatch, Surface};
use crate::poller::StatusPoller;
use crate::render::{render_screen, Tabs};
use crate::runtime::{Scheduler, TaskHandle};
use crate::state::{AppState, Screen, Tab, UnlockStatus};
use crate::tabs::{CategoriesTab, SearchTab, TabComponent, TabContext};
use crate::toast::Toaster;

/// Cheap handle to the dashboard; clones share one instance
#[derive(Clone)]
pub struct Dashboard {
    inner: Rc<Inner>,
}

struct Inner {
    state: RefCell<AppState>,
    surface: Rc<dyn Surface>,
    dispatch: Dispatch,
    categories: CategoriesTab,
    search: SearchTab,
    poller: StatusPoller,
    polling: RefCell<Option<TaskHandle>>,
    initialized: Cell<bool>,
    insight_url: String,
}

impl Dashboard {
    pub fn new(
        config: &Config,
        backend: Rc<dyn Backend>,
        surface: Rc<dyn Surface>,
        scheduler: Rc<dyn Scheduler>,
    ) -> Self {
        let inner = Rc::new_cyclic(|weak: &Weak<Inner>| {
            let weak = weak.clone();
            let dispatch: Dispatch = Rc::new(move |action| {
                if let Some(inner) = weak.upgrade() {
                    Dashboard { inner }.dispatch(action);
                }
            });

            let toaster = Rc::new(Toaster::new(
                Rc::clone(&surface),
                Rc::clone(&scheduler),
                &config.toast,
            ));
            let ctx = TabContext {
                backend: Rc::clone(&backend),
                surface: Rc::clone(&surface),
                scheduler: Rc::clone(&scheduler),
                dispatch: Rc::clone(&dispatch),
            };

            Inner {
                state: RefCell::new(AppState::default()),
                categories: CategoriesTab::new(ctx.clone(), &config.dashboard),
                search: SearchTab::new(ctx, toaster, &config.dashboard),
                poller: StatusPoller::new(backend, scheduler, config.dashboard.poll_interval()),
                surface,
                dispatch,
                polling: RefCell::new(None),
                initialized: Cell::new(false),
                insight_url: config.api.insight_url.clone(),
            }
        });

        Self { inner }
    }

    /// Paint the startup screen and begin polling. Only the first call has
    /// any effect.
    pub fn initialize(&self) {
        if self.inner.initialized.replace(true) {
            tracing::warn!("Dashboard already initialized");
            return;
        }

        tracing::info!(
            interval_ms = self.inner.poller.interval().as_millis() as u64,
            "Initializing dashboard"
        );
        self.render();

        let weak = Rc::downgrade(&self.inner);
        let handle = self.inner.poller.start(move |status| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            // A fetch that was in flight at shutdown may still complete
            if inner.polling.borrow().is_none() {
                return;
            }
            Dashboard { inner }.apply_status(status);
        });
        *self.inner.polling.borrow_mut() = Some(handle);
    }

    /// Stop polling. The page stays as it is.
    pub fn shutdown(&self) {
        if let Some(handle) = self.inner.polling.borrow_mut().take() {
            handle.cancel();
            tracing::info!("Status polling stopped");
        }
    }

    pub fn is_polling(&self) -> bool {
        self.inner.polling.borrow().is_some()
    }

    /// Repaint the whole page from state, then run the mount hook of the
    /// tab that was painted.
    pub fn render(&self) {
        let (view, mounted) = {
            let state = self.inner.state.borrow();
            let view = render_screen(
                &state,
                &Tabs {
                    categories: &self.inner.categories,
                    search: &self.inner.search,
                },
            );
            let mounted = (state.screen == Screen::Banking
                && state.active_tab.is_reachable(&state.status))
            .then_some(state.active_tab);
            (view, mounted)
        };

        tracing::debug!(tab = ?mounted, "Rendering");
        self.inner.surface.mount(view, &self.inner.dispatch);

        match mounted {
            Some(Tab::Categories) => self.inner.categories.on_mount(),
            Some(Tab::Search) => self.inner.search.on_mount(),
            _ => {}
        }
    }

    /// Store a freshly polled status; re-render only when a flag changed.
    pub fn apply_status(&self, status: UnlockStatus) -> bool {
        let changed = {
            let mut state = self.inner.state.borrow_mut();
            let changed = status.differs_from(&state.status);
            state.status = status;
            changed
        };

        if changed {
            tracing::info!(
                transactions = status.transactions_unlocked,
                categories = status.categories_unlocked,
                timeseries = status.timeseries_unlocked,
                "Unlock status changed"
            );
            self.render();
        }
        changed
    }

    pub fn navigate_to_banking(&self) {
        self.inner.state.borrow_mut().screen = Screen::Banking;
        self.render();
    }

    pub fn switch_tab(&self, tab: Tab) {
        {
            let mut state = self.inner.state.borrow_mut();
            state.active_tab = tab;
            state.selected_transaction = None;
        }
        self.render();
    }

    /// Route a user action to the operation it triggers
    pub fn dispatch(&self, action: Action) {
        tracing::debug!(?action, "Dispatching action");
        match action {
            Action::Begin => self.navigate_to_banking(),
            Action::OpenInsight => self.inner.surface.open_external(&self.inner.insight_url),
            Action::SwitchTab(tab) => self.switch_tab(tab),
            Action::RefreshCategories => self.inner.categories.refresh(),
            Action::SelectCategory(category) => self.inner.categories.select(category),
            Action::SubmitSearch => {
                self.inner.search.submit();
            }
        }
    }

    /// Snapshot of the application state
    pub fn state(&self) -> AppState {
        self.inner.state.borrow().clone()
    }

    pub fn categories(&self) -> CategoriesTab {
        self.inner.categories.clone()
    }

    pub fn search(&self) -> SearchTab {
        self.inner.search.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::render::{tab_button_id, BEGIN_BUTTON_ID, INSIGHT_BUTTON_ID};
    use crate::tabs::categories::{category_button_id, CATEGORY_MERCHANTS_ID};
    use crate::testing::{category, merchant, settle, Harness};
    use std::time::Duration;
    use tokio::task::LocalSet;
    use tokio::time::sleep;

    fn categories_only() -> UnlockStatus {
        UnlockStatus {
            categories_unlocked: true,
            ..Default::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_unlock_and_drill_down() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.backend.push_status(Ok(categories_only()));
                h.backend.push_categories(Ok(vec![
                    category("Groceries", 120.5),
                    category("Travel", 80.0),
                ]));
                let groceries = h.backend.defer_merchants("Groceries");
                h.backend
                    .push_merchants("Travel", Ok(vec![merchant("Delta", 410.25)]));

                h.dashboard.initialize();
                assert_eq!(h.dom.mount_count(), 1);
                assert!(h.dom.contains(BEGIN_BUTTON_ID));

                // First poll unlocks categories and repaints the checklist
                sleep(Duration::from_millis(2001)).await;
                settle().await;
                assert_eq!(h.dom.mount_count(), 2);
                assert_eq!(h.dashboard.state().status, categories_only());

                assert!(h.dom.click(BEGIN_BUTTON_ID));
                assert_eq!(h.dashboard.state().screen, Screen::Banking);
                assert!(h.dom.click(&tab_button_id(Tab::Categories)));
                settle().await;
                assert!(h.dom.contains(&category_button_id(1)));

                h.dom.click(&category_button_id(0));
                h.dom.click(&category_button_id(1));
                settle().await;
                groceries
                    .send(Ok(vec![merchant("Whole Foods", 95.0)]))
                    .unwrap();
                settle().await;

                let panel = h.dom.text_of(CATEGORY_MERCHANTS_ID).unwrap();
                assert!(panel.contains("Delta"));
                assert!(!panel.contains("Whole Foods"));
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_status_does_not_render() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.backend.push_status(Ok(UnlockStatus::default()));
                h.dashboard.initialize();

                sleep(Duration::from_millis(2001)).await;
                settle().await;
                assert_eq!(h.backend.call_count("status"), 1);
                assert_eq!(h.dom.mount_count(), 1);

                assert!(h.dashboard.apply_status(categories_only()));
                assert!(!h.dashboard.apply_status(categories_only()));
                assert_eq!(h.dom.mount_count(), 2);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_failure_keeps_status() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.backend.push_status(Ok(categories_only()));
                h.backend
                    .push_status(Err(ApiError::Transport("connection refused".into())));
                h.backend.push_status(Err(ApiError::Decode("expected value".into())));
                h.dashboard.initialize();

                sleep(Duration::from_millis(6001)).await;
                settle().await;
                assert_eq!(h.backend.call_count("status"), 3);
                assert_eq!(h.dashboard.state().status, categories_only());
                assert_eq!(h.dom.mount_count(), 2);
                assert!(h.dashboard.is_polling());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_is_idempotent() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.open_tab(Tab::Search);
                let before = h.dom.html();
                let bindings = h.dom.bindings();

                h.dashboard.render();
                assert_eq!(h.dom.html(), before);
                assert_eq!(h.dom.bindings(), bindings);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_initialize_runs_once() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.dashboard.initialize();
                h.dashboard.initialize();
                assert_eq!(h.dom.mount_count(), 1);

                sleep(Duration::from_millis(2001)).await;
                assert_eq!(h.backend.call_count("status"), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_polling() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                let in_flight = h.backend.defer_status();
                h.dashboard.initialize();

                sleep(Duration::from_millis(2001)).await;
                h.dashboard.shutdown();
                assert!(!h.dashboard.is_polling());

                in_flight.send(Ok(categories_only())).unwrap();
                sleep(Duration::from_millis(10_000)).await;
                settle().await;

                assert_eq!(h.backend.call_count("status"), 1);
                assert_eq!(h.dashboard.state().status, UnlockStatus::default());
                assert_eq!(h.dom.mount_count(), 1);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_tab_clears_selected_transaction() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.open_tab(Tab::Transactions);
                h.dashboard.inner.state.borrow_mut().selected_transaction = Some("tx-1".into());

                h.dashboard.switch_tab(Tab::Timeseries);
                let state = h.dashboard.state();
                assert_eq!(state.active_tab, Tab::Timeseries);
                assert_eq!(state.selected_transaction, None);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_locked_tab_does_not_mount() {
        LocalSet::new()
            .run_until(async {
                let h = Harness::new();
                h.dashboard.initialize();
                h.dashboard.navigate_to_banking();

                assert!(!h.dom.click(&tab_button_id(Tab::Categories)));
                h.dashboard.switch_tab(Tab::Categories);
                settle().await;

                assert!(h.dom.text().contains("Complete the Sorted Set module"));
                assert_eq!(h.backend.call_count("categories"), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_insight_button_opens_configured_url() {
        LocalSet::new()
            .run_until(async {
                let mut config = Config::default();
                config.api.insight_url = "http://insight.local:5540".into();
                let h = Harness::with_config(config);
                h.dashboard.initialize();

                assert!(h.dom.click(INSIGHT_BUTTON_ID));
                h.dashboard.navigate_to_banking();
                assert!(h.dom.click(INSIGHT_BUTTON_ID));
                assert_eq!(
                    h.dom.opened_urls(),
                    vec!["http://insight.local:5540", "http://insight.local:5540"]
                );
            })
            .await;
    }
}
