//! Tab Components
//!
//! Each data tab owns a cache that outlives re-renders and tab switches,
//! renders its fragment from that cache, and patches only its own result
//! containers when a fetch completes. Full-page renders are the
//! controller's business; a tab never triggers one.
//!
//! In-flight fetches are never aborted. Instead every response is checked
//! against the request that is current for its slot (the selected category,
//! or the latest request id) before it is written to the cache.

pub mod categories;
pub mod search;

mod request;

pub use categories::{CategoriesCache, CategoriesTab};
pub use search::{SearchCache, SearchTab};

pub(crate) use request::RequestSeq;

use futures_util::future::LocalBoxFuture;
use leptos::*;
use std::rc::Rc;

use crate::api::Backend;
use crate::dom::{Dispatch, Surface, View};
use crate::runtime::Scheduler;

/// A tab that can be mounted into the banking screen
pub trait TabComponent {
    /// Markup and bindings for the whole tab, built from the cache
    fn render(&self) -> View;

    /// Runs once after every full render that includes this tab
    fn on_mount(&self) {}
}

/// Collaborators shared by all tabs
#[derive(Clone)]
pub struct TabContext {
    pub backend: Rc<dyn Backend>,
    pub surface: Rc<dyn Surface>,
    pub scheduler: Rc<dyn Scheduler>,
    pub dispatch: Dispatch,
}

impl TabContext {
    /// Replace one container's content; a container that is not on the
    /// page (the tab is not mounted) is left to the next render.
    pub(crate) fn patch(&self, container_id: &str, view: View) -> bool {
        let patched = self.surface.patch(container_id, view, &self.dispatch);
        if !patched {
            tracing::debug!(container_id, "Container not mounted, cache updated only");
        }
        patched
    }

    pub(crate) fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        self.scheduler.spawn(task);
    }
}

/// Centered grey message used for prompts and empty states
#[component]
pub(crate) fn Notice(
    #[prop(into)] message: String,
    /// Smaller second line
    #[prop(optional)]
    hint: Option<&'static str>,
    #[prop(optional)] icon: Option<&'static str>,
) -> impl IntoView {
    view! {
        <div class="text-center py-8 text-gray-500">
            {icon.map(|icon| view! { <div class="text-4xl mb-4">{icon}</div> })}
            <p>{message}</p>
            {hint.map(|hint| view! { <p class="text-sm mt-2">{hint}</p> })}
        </div>
    }
}

pub(crate) fn format_amount(amount: f64) -> String {
    format!("${:.2}", amount)
}
