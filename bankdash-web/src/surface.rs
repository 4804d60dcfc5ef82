//! DOM Surface
//!
//! Paints views into the page with `innerHTML` and attaches one
//! [`EventListener`] per binding. Listeners are owned here, so dropping
//! them is what detaches them from the page.

use bankdash::{Binding, Dispatch, EventKind, Surface, ToastId, View};
use gloo_events::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, KeyboardEvent};

struct Listener {
    element_id: String,
    _listener: EventListener,
}

pub struct BrowserSurface {
    document: Document,
    root: Element,
    listeners: RefCell<Vec<Listener>>,
}

impl BrowserSurface {
    /// Attach to the element with id `root_id`
    pub fn attach(root_id: &str) -> Option<Self> {
        let document = web_sys::window()?.document()?;
        let root = document.get_element_by_id(root_id)?;
        Some(Self {
            document,
            root,
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn bind_all(&self, bindings: Vec<Binding>, dispatch: &Dispatch) {
        let mut listeners = self.listeners.borrow_mut();
        for binding in bindings {
            let Some(element) = self.document.get_element_by_id(&binding.element_id) else {
                tracing::debug!(element_id = %binding.element_id, "Binding target not on the page");
                continue;
            };
            listeners.push(Listener {
                element_id: binding.element_id.clone(),
                _listener: listen(&element, binding, dispatch),
            });
        }
    }
}

/// Handlers run after the event callback returns: an action may repaint
/// the page, dropping the very listener that fired.
fn listen(element: &Element, binding: Binding, dispatch: &Dispatch) -> EventListener {
    let dispatch = Rc::clone(dispatch);
    let action = binding.action;
    let fire = move || {
        let dispatch = Rc::clone(&dispatch);
        let action = action.clone();
        wasm_bindgen_futures::spawn_local(async move { dispatch(action) });
    };

    match binding.event {
        EventKind::Click => EventListener::new(element, "click", move |_| fire()),
        EventKind::EnterKey => EventListener::new(element, "keypress", move |event| {
            let enter = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|key| key.key() == "Enter");
            if enter {
                fire();
            }
        }),
    }
}

impl Surface for BrowserSurface {
    fn mount(&self, view: View, dispatch: &Dispatch) {
        self.listeners.borrow_mut().clear();
        self.root.set_inner_html(&view.html);
        self.bind_all(view.bindings, dispatch);
    }

    fn patch(&self, container_id: &str, view: View, dispatch: &Dispatch) -> bool {
        let Some(container) = self.document.get_element_by_id(container_id) else {
            return false;
        };

        // Listeners on elements inside the container go with the old markup
        self.listeners.borrow_mut().retain(|listener| {
            self.document
                .get_element_by_id(&listener.element_id)
                .is_some_and(|el| !container.contains(Some(&*el)))
        });
        container.set_inner_html(&view.html);
        self.bind_all(view.bindings, dispatch);
        true
    }

    fn input_value(&self, element_id: &str) -> Option<String> {
        let input = self
            .document
            .get_element_by_id(element_id)?
            .dyn_into::<HtmlInputElement>()
            .ok()?;
        Some(input.value())
    }

    fn show_toast(&self, _id: ToastId, html: String) {
        let Some(body) = self.document.body() else {
            return;
        };
        if let Err(e) = body.insert_adjacent_html("beforeend", &html) {
            tracing::warn!("Failed to show toast: {:?}", e);
        }
    }

    fn fade_toast(&self, id: ToastId) {
        let toast = self
            .document
            .get_element_by_id(&id.to_string())
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());
        if let Some(toast) = toast {
            let _ = toast.style().set_property("opacity", "0");
        }
    }

    fn remove_toast(&self, id: ToastId) {
        if let Some(toast) = self.document.get_element_by_id(&id.to_string()) {
            toast.remove();
        }
    }

    fn open_external(&self, url: &str) {
        let opened = web_sys::window().map(|window| window.open_with_url_and_target(url, "_blank"));
        if let Some(Err(e)) = opened {
            tracing::warn!(url, "Failed to open window: {:?}", e);
        }
    }
}
