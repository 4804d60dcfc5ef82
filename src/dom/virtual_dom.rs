//! In-memory Surface
//!
//! Holds the painted markup and its listeners so the engine can run
//! without a browser. Used by the CLI and throughout the tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::markup::Markup;
use super::{Binding, Dispatch, EventKind, Surface, ToastId, View};

/// A toast currently attached to the page
#[derive(Debug, Clone, PartialEq)]
pub struct ToastState {
    pub id: ToastId,
    pub html: String,
    pub faded: bool,
}

impl ToastState {
    /// Visible text of the toast
    pub fn text(&self) -> String {
        Markup::parse_lossy(&self.html).text()
    }
}

#[derive(Default)]
struct Page {
    root: Option<Markup>,
    bindings: Vec<Binding>,
    dispatch: Option<Dispatch>,
    /// Values typed into inputs since the last mount
    inputs: HashMap<String, String>,
    toasts: Vec<ToastState>,
    opened: Vec<String>,
    mounts: usize,
    patches: usize,
}

/// Surface that keeps the page as a parsed element tree
#[derive(Default)]
pub struct VirtualDom {
    page: RefCell<Page>,
}

impl VirtualDom {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page showing `view`, with listeners that do nothing
    pub fn painted(view: View) -> Self {
        let dom = Self::new();
        let dispatch: Dispatch = Rc::new(|_| {});
        dom.mount(view, &dispatch);
        dom
    }

    /// Serialized page content (empty before the first mount)
    pub fn html(&self) -> String {
        self.page
            .borrow()
            .root
            .as_ref()
            .map(Markup::to_html)
            .unwrap_or_default()
    }

    /// Visible text of the whole page
    pub fn text(&self) -> String {
        self.page
            .borrow()
            .root
            .as_ref()
            .map(Markup::text)
            .unwrap_or_default()
    }

    /// Visible text of one element
    pub fn text_of(&self, element_id: &str) -> Option<String> {
        let page = self.page.borrow();
        Some(page.root.as_ref()?.find(element_id)?.text())
    }

    /// Attribute of one element; valueless attributes read as `""`
    pub fn attr(&self, element_id: &str, name: &str) -> Option<String> {
        let page = self.page.borrow();
        page.root
            .as_ref()?
            .find(element_id)?
            .attr(name)
            .map(str::to_owned)
    }

    pub fn contains(&self, element_id: &str) -> bool {
        self.page
            .borrow()
            .root
            .as_ref()
            .is_some_and(|root| root.contains_id(element_id))
    }

    /// Number of full-page mounts so far
    pub fn mount_count(&self) -> usize {
        self.page.borrow().mounts
    }

    /// Number of successful container patches so far
    pub fn patch_count(&self) -> usize {
        self.page.borrow().patches
    }

    pub fn bindings(&self) -> Vec<Binding> {
        self.page.borrow().bindings.clone()
    }

    pub fn is_bound(&self, element_id: &str, event: EventKind) -> bool {
        self.page
            .borrow()
            .bindings
            .iter()
            .any(|b| b.element_id == element_id && b.event == event)
    }

    /// Type into an input; the value lasts until the next mount
    pub fn set_input(&self, element_id: &str, value: &str) {
        self.page
            .borrow_mut()
            .inputs
            .insert(element_id.to_string(), value.to_string());
    }

    /// Fire the click listener on an element. Returns `false` when nothing
    /// is bound there.
    pub fn click(&self, element_id: &str) -> bool {
        self.fire(element_id, EventKind::Click)
    }

    /// Fire the Enter keypress listener on an element
    pub fn press_enter(&self, element_id: &str) -> bool {
        self.fire(element_id, EventKind::EnterKey)
    }

    pub fn toasts(&self) -> Vec<ToastState> {
        self.page.borrow().toasts.clone()
    }

    /// URLs passed to [`Surface::open_external`]
    pub fn opened_urls(&self) -> Vec<String> {
        self.page.borrow().opened.clone()
    }

    fn fire(&self, element_id: &str, event: EventKind) -> bool {
        // Release the page before dispatching: handlers repaint it.
        let (action, dispatch) = {
            let page = self.page.borrow();
            let Some(binding) = page
                .bindings
                .iter()
                .find(|b| b.element_id == element_id && b.event == event)
            else {
                return false;
            };
            let Some(dispatch) = page.dispatch.clone() else {
                return false;
            };
            (binding.action.clone(), dispatch)
        };

        dispatch(action);
        true
    }
}

impl Surface for VirtualDom {
    fn mount(&self, view: View, dispatch: &Dispatch) {
        let mut page = self.page.borrow_mut();
        page.root = Some(Markup::parse_lossy(&view.html));
        page.bindings = view.bindings;
        page.dispatch = Some(dispatch.clone());
        page.inputs.clear();
        page.mounts += 1;
    }

    fn patch(&self, container_id: &str, view: View, dispatch: &Dispatch) -> bool {
        let mut page = self.page.borrow_mut();
        let Some(container) = page
            .root
            .as_mut()
            .and_then(|root| root.find_mut(container_id))
        else {
            return false;
        };
        container.children = Markup::parse_lossy(&view.html).nodes;

        // Listeners and typed values inside the container went with the
        // old children, even where the new markup reuses their ids.
        let page = &mut *page;
        if let Some(root) = page.root.as_ref() {
            let container = root.find(container_id);
            let survives =
                |id: &str| root.contains_id(id) && container.map_or(true, |c| c.find(id).is_none());
            page.bindings.retain(|b| survives(&b.element_id));
            page.inputs.retain(|id, _| survives(id));
        }
        page.bindings.extend(view.bindings);
        page.dispatch = Some(dispatch.clone());
        page.patches += 1;
        true
    }

    fn input_value(&self, element_id: &str) -> Option<String> {
        let page = self.page.borrow();
        if let Some(value) = page.inputs.get(element_id) {
            return Some(value.clone());
        }
        page.root
            .as_ref()?
            .find(element_id)?
            .attr("value")
            .map(str::to_owned)
    }

    fn show_toast(&self, id: ToastId, html: String) {
        self.page.borrow_mut().toasts.push(ToastState {
            id,
            html,
            faded: false,
        });
    }

    fn fade_toast(&self, id: ToastId) {
        let mut page = self.page.borrow_mut();
        if let Some(toast) = page.toasts.iter_mut().find(|t| t.id == id) {
            toast.faded = true;
        }
    }

    fn remove_toast(&self, id: ToastId) {
        self.page.borrow_mut().toasts.retain(|t| t.id != id);
    }

    fn open_external(&self, url: &str) {
        self.page.borrow_mut().opened.push(url.to_string());
    }
}
