//! # Bankdash
//!
//! State and render engine for the banking workshop dashboard: a single page
//! whose tabs unlock as the matching backend modules are completed.
//!
//! ## Features
//!
//! - **Progressive unlock**: polls `/api/status` and repaints only when a
//!   flag flips
//! - **Cached tabs**: categories and search keep their data across re-renders
//!   and patch their own result containers
//! - **Stale-response safety**: a late answer to a superseded request is
//!   dropped instead of overwriting newer data
//! - **Toasts**: one notification at a time, with server and round-trip
//!   latency
//!
//! ## Modules
//!
//! - [`controller`]: the [`Dashboard`] that owns state and routes actions
//! - [`render`]: full-page rendering for each screen
//! - [`tabs`]: the categories and search tabs
//! - [`poller`]: unlock status polling
//! - [`api`]: the [`Backend`] trait and its HTTP implementation
//! - [`dom`]: rendered views, event bindings and the [`Surface`] trait
//! - [`runtime`]: task spawning and timers
//!
//! The engine is single-threaded. It runs inside a tokio `LocalSet` on the
//! command line and on the page's event loop in the browser.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bankdash::{Config, Dashboard, HttpBackend, TokioScheduler, VirtualDom};
//! use std::rc::Rc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env();
//!     let backend = Rc::new(HttpBackend::new(&config.api)?);
//!     let page = Rc::new(VirtualDom::new());
//!
//!     tokio::task::LocalSet::new()
//!         .run_until(async {
//!             let dashboard = Dashboard::new(&config, backend, page.clone(), Rc::new(TokioScheduler));
//!             dashboard.initialize();
//!             tokio::time::sleep(config.dashboard.poll_interval() * 2).await;
//!             println!("{}", page.text());
//!             dashboard.shutdown();
//!         })
//!         .await;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod controller;
pub mod dom;
pub mod poller;
pub mod render;
pub mod runtime;
pub mod state;
pub mod tabs;
pub mod toast;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiError, Backend, CategoryTotal, MerchantTotal, SearchHit, SearchResponse, Timed};

#[cfg(feature = "native")]
pub use api::HttpBackend;

pub use config::{
    generate_default_config, ApiConfig, Config, ConfigError, DashboardConfig, LoggingConfig,
    ToastConfig,
};

pub use controller::Dashboard;

pub use dom::{
    text_content, Action, Binding, Dispatch, EventKind, Surface, ToastId, View, VirtualDom,
};

pub use runtime::{every, Scheduler, TaskHandle};

#[cfg(any(test, feature = "native"))]
pub use runtime::TokioScheduler;

pub use state::{AppState, Feature, Screen, Tab, UnlockStatus};

pub use toast::{Timing, Toaster};
