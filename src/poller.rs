//! Unlock Status Polling
//!
//! Queries `/api/status` on a fixed interval for the lifetime of the
//! dashboard. Each tick's fetch runs as its own task, so a slow response
//! never delays the next tick or any tab's fetches. Failed ticks are
//! logged and skipped; the next tick simply tries again.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::api::Backend;
use crate::runtime::{every, Scheduler, TaskHandle};
use crate::state::UnlockStatus;

pub struct StatusPoller {
    backend: Rc<dyn Backend>,
    scheduler: Rc<dyn Scheduler>,
    interval: Duration,
}

impl StatusPoller {
    pub fn new(backend: Rc<dyn Backend>, scheduler: Rc<dyn Scheduler>, interval: Duration) -> Self {
        Self {
            backend,
            scheduler,
            interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling, handing every successfully fetched status to
    /// `on_status`. A response from an older tick that completes after a
    /// newer tick's response was delivered is dropped.
    pub fn start<F>(&self, on_status: F) -> TaskHandle
    where
        F: Fn(UnlockStatus) + 'static,
    {
        let on_status = Rc::new(on_status);
        let issued = Rc::new(Cell::new(0u64));
        let delivered = Rc::new(Cell::new(0u64));
        let backend = Rc::clone(&self.backend);
        let spawner = Rc::clone(&self.scheduler);

        every(&self.scheduler, self.interval, move || {
            let tick = issued.get() + 1;
            issued.set(tick);

            let backend = Rc::clone(&backend);
            let delivered = Rc::clone(&delivered);
            let on_status = Rc::clone(&on_status);
            spawner.spawn(Box::pin(async move {
                match backend.status().await {
                    Ok(status) => {
                        if tick < delivered.get() {
                            tracing::debug!(tick, "Discarding status from superseded poll");
                            return;
                        }
                        delivered.set(tick);
                        on_status(status);
                    }
                    Err(e) => {
                        tracing::warn!(tick, "Failed to check status: {}", e);
                    }
                }
            }));
        })
    }
}
