//! Bankdash Web
//!
//! Browser front-end for the banking workshop dashboard. The engine in the
//! `bankdash` crate does all state handling and rendering; this crate
//! supplies the browser halves of its seams:
//!
//! - [`BrowserSurface`]: paints into `#app` and owns the DOM listeners
//! - [`GlooBackend`]: `fetch` via gloo-net, timed with `performance.now()`
//! - [`BrowserScheduler`]: `spawn_local` and `setTimeout`
//!
//! The API base URL defaults to `http://localhost:8000` and can be
//! overridden by setting `bankdash_api_url` in local storage.

mod backend;
mod scheduler;
mod surface;

pub use backend::{get_api_base, GlooBackend};
pub use scheduler::BrowserScheduler;
pub use surface::BrowserSurface;

use bankdash::{Config, Dashboard};
use gloo_events::EventListener;
use std::cell::RefCell;
use std::rc::Rc;

/// Id of the element the dashboard paints into
pub const ROOT_ID: &str = "app";

thread_local! {
    /// Keeps the dashboard (and with it the poller) alive for the page's lifetime
    static DASHBOARD: RefCell<Option<Dashboard>> = const { RefCell::new(None) };
}

/// Start the dashboard on the current page
pub fn start() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    let mut config = Config::default();
    config.api.base_url = get_api_base();

    let Some(surface) = BrowserSurface::attach(ROOT_ID) else {
        tracing::error!("No #{} element on the page", ROOT_ID);
        return;
    };

    let dashboard = Dashboard::new(
        &config,
        Rc::new(GlooBackend::new(&config.api)),
        Rc::new(surface),
        Rc::new(BrowserScheduler),
    );
    dashboard.initialize();

    // Stop polling when the page is torn down
    if let Some(window) = web_sys::window() {
        let dashboard = dashboard.clone();
        EventListener::new(&window, "pagehide", move |_| dashboard.shutdown()).forget();
    }

    DASHBOARD.with(|slot| *slot.borrow_mut() = Some(dashboard));
}
