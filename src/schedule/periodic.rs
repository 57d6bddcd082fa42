//! Cancellable periodic tasks.
//!
//! # Responsibilities
//! - Run a tick body immediately, then once per period
//! - Hand back a `TaskHandle` that cancels only its own task
//! - Let a scheduler-wide cancel stop every task it started
//!
//! # Design Decisions
//! - Cancellation is cooperative: it is observed between ticks, so an
//!   in-flight tick finishes (or hits its own timeout) before the loop exits
//! - A slow tick delays the next one instead of triggering a burst
//! - `abort` exists for teardown, where in-flight ticks are abandoned

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Starts periodic tasks that share a common cancellation root.
#[derive(Debug, Default)]
pub struct Scheduler {
    root: CancellationToken,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `tick` now and then every `period` until cancelled.
    pub fn every<F, Fut>(&self, name: &'static str, period: Duration, mut tick: F) -> TaskHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.root.child_token();
        let loop_token = token.clone();
        let period = period.max(Duration::from_millis(1));

        let join = tokio::spawn(async move {
            tracing::info!(task = name, period_ms = period.as_millis() as u64, "Periodic task starting");

            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                tick().await;
            }

            tracing::info!(task = name, "Periodic task stopped");
        });

        TaskHandle { name, token, join }
    }

    /// Cancel a single task. Other tasks keep running.
    pub fn cancel(&self, handle: &TaskHandle) {
        handle.cancel();
    }

    /// Cancel every task started by this scheduler.
    pub fn cancel_all(&self) {
        self.root.cancel();
    }
}

/// Handle to a running periodic task.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    token: CancellationToken,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Prevent any further tick from starting.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Drop the task at its next suspension point, in-flight tick included.
    pub fn abort(&self) {
        self.join.abort();
    }

    /// Wait for the task to exit after a cancel.
    pub async fn stopped(self) {
        if let Err(e) = self.join.await {
            if !e.is_cancelled() {
                tracing::error!(task = self.name, error = %e, "Periodic task panicked");
            }
        }
    }
}
