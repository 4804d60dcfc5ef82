//! Browser Scheduler
//!
//! Tasks run on the page's microtask queue; timers are `setTimeout` and
//! `setInterval`.

use bankdash::Scheduler;
use futures_util::future::LocalBoxFuture;
use futures_util::stream::{LocalBoxStream, StreamExt};
use gloo_timers::future::{IntervalStream, TimeoutFuture};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(TimeoutFuture::new(millis(duration)))
    }

    fn interval(&self, period: Duration) -> LocalBoxStream<'static, ()> {
        IntervalStream::new(millis(period)).boxed_local()
    }
}

fn millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}
