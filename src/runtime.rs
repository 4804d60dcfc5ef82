//! Task Scheduling
//!
//! The engine is single-threaded and cooperative: fetch completions, timer
//! ticks and user input all run as tasks on one local queue. A
//! [`Scheduler`] spawns those tasks and provides timers; the native build
//! uses tokio's `LocalSet`, the browser build the page's event loop.

use futures_util::future::{AbortHandle, Abortable, LocalBoxFuture};
use futures_util::stream::{LocalBoxStream, StreamExt};
use std::rc::Rc;
use std::time::Duration;

/// Shortest period an interval accepts
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Spawns local tasks and provides timers
pub trait Scheduler {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;

    /// Yields once per `period`, starting one period from now. Ticks stay on
    /// the schedule fixed at creation however late a consumer takes them.
    fn interval(&self, period: Duration) -> LocalBoxStream<'static, ()>;
}

/// Cancellation handle for a repeating task
///
/// The task stops when [`TaskHandle::cancel`] is called or the handle is
/// dropped.
#[derive(Debug)]
pub struct TaskHandle {
    abort: AbortHandle,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}

/// Run `tick` every `period`, first after one full period
pub fn every<F>(scheduler: &Rc<dyn Scheduler>, period: Duration, mut tick: F) -> TaskHandle
where
    F: FnMut() + 'static,
{
    let (abort, registration) = AbortHandle::new_pair();
    let mut ticks = scheduler.interval(period.max(MIN_PERIOD));

    let ticker = async move {
        while ticks.next().await.is_some() {
            tick();
        }
    };

    scheduler.spawn(Box::pin(async move {
        let _ = Abortable::new(ticker, registration).await;
    }));

    TaskHandle { abort }
}

/// Scheduler over tokio's current-thread runtime
///
/// Tasks are spawned with [`tokio::task::spawn_local`], so the dashboard
/// must be driven from inside a [`tokio::task::LocalSet`].
#[cfg(any(test, feature = "native"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[cfg(any(test, feature = "native"))]
impl Scheduler for TokioScheduler {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn interval(&self, period: Duration) -> LocalBoxStream<'static, ()> {
        use tokio::time::{interval_at, Instant, MissedTickBehavior};

        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        futures_util::stream::unfold(interval, |mut interval| async move {
            interval.tick().await;
            Some(((), interval))
        })
        .boxed_local()
    }
}
