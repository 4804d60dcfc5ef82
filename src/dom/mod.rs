//! Page Surface
//!
//! The dashboard never touches a real document directly. Screens and tab
//! fragments are written as leptos views and rendered to HTML; the
//! resulting [`View`]s are painted onto a [`Surface`]:
//!
//! - **mount**: replace the whole page and rebind every listener
//! - **patch**: replace the children of one container, leaving the rest of
//!   the page and its listeners alone
//! - **toasts**: a single floating notification, added and removed by id
//!
//! The browser build implements [`Surface`] over `web-sys`; the CLI and the
//! tests use [`VirtualDom`].

mod events;
mod markup;
mod virtual_dom;

pub use events::{Action, Binding, Dispatch, EventKind, View};
pub use markup::{text_content, MarkupError};
pub use virtual_dom::{ToastState, VirtualDom};

use std::fmt;

/// Identity of one shown toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(pub u64);

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

/// Something a [`View`] can be painted onto
pub trait Surface {
    /// Replace the page content, drop every previous listener and attach
    /// the view's bindings.
    fn mount(&self, view: View, dispatch: &Dispatch);

    /// Replace the children of `container_id` with the view content and
    /// attach its bindings. Returns `false` when the container is not on
    /// the page.
    fn patch(&self, container_id: &str, view: View, dispatch: &Dispatch) -> bool;

    /// Current value of an input element
    fn input_value(&self, element_id: &str) -> Option<String>;

    /// Append a toast element; `html` carries the toast's id
    fn show_toast(&self, id: ToastId, html: String);

    fn fade_toast(&self, id: ToastId);

    fn remove_toast(&self, id: ToastId);

    /// Open a URL in a new window
    fn open_external(&self, url: &str);
}
