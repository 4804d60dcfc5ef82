//! Event Bindings
//!
//! Renders produce a [`View`]: the HTML plus the listeners that belong to
//! exactly the elements in that markup. Listeners carry typed [`Action`]
//! payloads instead of reading identifiers back out of the page.

use leptos::IntoView;
use std::rc::Rc;

use crate::state::Tab;

/// What a bound listener asks the dashboard to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Leave the startup screen
    Begin,
    /// Open the data-store insight tool in a new window
    OpenInsight,
    SwitchTab(Tab),
    RefreshCategories,
    SelectCategory(String),
    /// Run a search with the current contents of the search input
    SubmitSearch,
}

/// DOM event a binding listens for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
    /// A keypress whose key is Enter
    EnterKey,
}

/// A listener to attach to one element of a freshly painted view
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub element_id: String,
    pub event: EventKind,
    pub action: Action,
}

impl Binding {
    pub fn click(element_id: impl Into<String>, action: Action) -> Self {
        Self {
            element_id: element_id.into(),
            event: EventKind::Click,
            action,
        }
    }

    pub fn enter_key(element_id: impl Into<String>, action: Action) -> Self {
        Self {
            element_id: element_id.into(),
            event: EventKind::EnterKey,
            action,
        }
    }
}

/// Callback surfaces use to route triggered bindings back to the dashboard
pub type Dispatch = Rc<dyn Fn(Action)>;

/// Rendered markup together with the bindings for the elements it contains
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub html: String,
    pub bindings: Vec<Binding>,
}

impl View {
    /// Wrap already rendered HTML
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            bindings: Vec::new(),
        }
    }

    /// Render a leptos view to HTML
    pub fn render<F, N>(build: F) -> Self
    where
        F: FnOnce() -> N + 'static,
        N: IntoView,
    {
        Self::new(leptos::ssr::render_to_string(build).to_string())
    }

    pub fn bind(mut self, binding: Binding) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn with_bindings(mut self, bindings: impl IntoIterator<Item = Binding>) -> Self {
        self.bindings.extend(bindings);
        self
    }
}
