//! Toast Notifications
//!
//! A single-slot notification manager. Showing a toast replaces the one on
//! screen outright; each toast fades and removes itself on its own timers,
//! which become no-ops once a newer toast has taken the slot.

use leptos::*;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::ToastConfig;
use crate::dom::{Surface, ToastId, View};
use crate::runtime::Scheduler;

const TOAST_CLASS: &str = "fixed bottom-4 right-4 bg-gray-900 text-white px-4 py-3 rounded-lg \
     shadow-lg text-sm font-medium z-50 transition-opacity duration-300";

/// A labelled duration shown after the toast message
#[derive(Debug, Clone, PartialEq)]
pub struct Timing {
    pub label: String,
    pub ms: f64,
}

impl Timing {
    pub fn new(label: impl Into<String>, ms: f64) -> Self {
        Self {
            label: label.into(),
            ms,
        }
    }
}

pub struct Toaster {
    surface: Rc<dyn Surface>,
    scheduler: Rc<dyn Scheduler>,
    slot: Rc<Cell<Option<ToastId>>>,
    next_id: Cell<u64>,
    fade_after: Duration,
    remove_after: Duration,
}

impl Toaster {
    pub fn new(surface: Rc<dyn Surface>, scheduler: Rc<dyn Scheduler>, config: &ToastConfig) -> Self {
        Self {
            surface,
            scheduler,
            slot: Rc::new(Cell::new(None)),
            next_id: Cell::new(0),
            fade_after: Duration::from_millis(config.fade_after_ms),
            remove_after: Duration::from_millis(config.remove_after_ms),
        }
    }

    /// Show `message | LABEL: <ms>ms | ...`
    pub fn show(&self, message: &str, timings: &[Timing]) -> ToastId {
        self.replace(|id| toast_html(id, message, timings))
    }

    /// Remove whatever toast is showing and show a new one whose HTML is
    /// built by `build`
    pub fn replace(&self, build: impl FnOnce(ToastId) -> String) -> ToastId {
        if let Some(previous) = self.slot.take() {
            self.surface.remove_toast(previous);
        }

        let id = ToastId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.surface.show_toast(id, build(id));
        self.slot.set(Some(id));

        let fade = self.scheduler.sleep(self.fade_after);
        let (slot, surface) = (Rc::clone(&self.slot), Rc::clone(&self.surface));
        self.scheduler.spawn(Box::pin(async move {
            fade.await;
            if slot.get() == Some(id) {
                surface.fade_toast(id);
            }
        }));

        let remove = self.scheduler.sleep(self.remove_after);
        let (slot, surface) = (Rc::clone(&self.slot), Rc::clone(&self.surface));
        self.scheduler.spawn(Box::pin(async move {
            remove.await;
            if slot.get() == Some(id) {
                slot.set(None);
                surface.remove_toast(id);
            }
        }));

        id
    }

    /// The toast currently on screen
    pub fn current(&self) -> Option<ToastId> {
        self.slot.get()
    }
}

fn toast_html(id: ToastId, message: &str, timings: &[Timing]) -> String {
    let message = message.to_string();
    let timings = timings.to_vec();
    View::render(move || {
        view! {
            <div id=id.to_string() class=TOAST_CLASS>
                {message}
                {timings
                    .into_iter()
                    .map(|timing| {
                        view! {
                            {format!(" | {}: ", timing.label)}
                            <span style="color: #86efac">{format!("{}ms", timing.ms)}</span>
                        }
                    })
                    .collect_view()}
            </div>
        }
    })
    .html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::VirtualDom;
    use crate::runtime::TokioScheduler;
    use tokio::task::LocalSet;
    use tokio::time::sleep;

    fn toaster() -> (Toaster, Rc<VirtualDom>) {
        let dom = Rc::new(VirtualDom::new());
        let toaster = Toaster::new(dom.clone(), Rc::new(TokioScheduler), &ToastConfig::default());
        (toaster, dom)
    }

    #[test]
    fn test_content_lists_timings() {
        let html = toast_html(
            ToastId(3),
            "Found 4 results",
            &[Timing::new("FT.SEARCH", 1.5), Timing::new("Roundtrip", 42.0)],
        );
        let page = VirtualDom::painted(View::new(html));
        assert_eq!(
            page.text_of("toast-3").as_deref(),
            Some("Found 4 results | FT.SEARCH: 1.5ms | Roundtrip: 42ms")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_fades_then_removes() {
        LocalSet::new()
            .run_until(async {
                let (toaster, dom) = toaster();
                let id = toaster.show("Saved", &[]);
                assert_eq!(dom.toasts().len(), 1);
                assert!(!dom.toasts()[0].faded);

                sleep(Duration::from_millis(3499)).await;
                assert!(!dom.toasts()[0].faded);

                sleep(Duration::from_millis(2)).await;
                assert!(dom.toasts()[0].faded);
                assert_eq!(toaster.current(), Some(id));

                sleep(Duration::from_millis(500)).await;
                assert!(dom.toasts().is_empty());
                assert_eq!(toaster.current(), None);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_show_replaces_first() {
        LocalSet::new()
            .run_until(async {
                let (toaster, dom) = toaster();
                toaster.show("first", &[]);

                sleep(Duration::from_millis(3000)).await;
                let second = toaster.show("second", &[]);

                let toasts = dom.toasts();
                assert_eq!(toasts.len(), 1);
                assert_eq!(toasts[0].id, second);
                assert_eq!(toasts[0].text(), "second");

                // The first toast's timers fire at 3500 and 4000; neither
                // touches the second toast.
                sleep(Duration::from_millis(1100)).await;
                let toasts = dom.toasts();
                assert_eq!(toasts.len(), 1);
                assert_eq!(toasts[0].id, second);
                assert!(!toasts[0].faded);

                // Second toast: fades at 6500, gone at 7000
                sleep(Duration::from_millis(2500)).await;
                assert!(dom.toasts()[0].faded);
                sleep(Duration::from_millis(500)).await;
                assert!(dom.toasts().is_empty());
            })
            .await;
    }
}
