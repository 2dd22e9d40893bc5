//! Bounded re-derivation retry
//!
//! When an event references a tool the filament list cannot resolve
//! yet (external trackers load asynchronously), the session retries
//! the derivation on a growing delay instead of rendering a permanent
//! placeholder. The budget is per event: a superseding event cancels
//! the pending attempt and resets the counter.

use std::time::Duration;
use tokio::task::JoinHandle;

/// Attempts allowed for one event before giving up.
pub const MAX_RETRY_ATTEMPTS: u32 = 5;

/// Cancellable retry state for the session's current event.
#[derive(Debug, Default)]
pub struct RetryScheduler {
    sequence: u64,
    attempts: u32,
    pending: Option<JoinHandle<()>>,
}

impl RetryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new event took over: cancel any pending attempt and reset the
    /// budget for the new sequence number.
    pub fn supersede(&mut self, sequence: u64) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
        self.sequence = sequence;
        self.attempts = 0;
    }

    /// Attempts consumed for the current event.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Schedule the next attempt for the given event sequence.
    ///
    /// Fires `replay` after `attempt * 1s`. Returns false without
    /// scheduling when the sequence is stale or the budget is spent.
    /// `replay` must itself check the session sequence before
    /// rendering; a task can fire after a newer event has landed.
    pub fn schedule<F>(&mut self, sequence: u64, replay: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if sequence != self.sequence {
            return false;
        }
        if self.attempts >= MAX_RETRY_ATTEMPTS {
            tracing::debug!(sequence, "retry budget exhausted");
            return false;
        }
        self.attempts += 1;
        let delay = Duration::from_millis(u64::from(self.attempts) * 1000);

        if let Some(task) = self.pending.take() {
            task.abort();
        }
        tracing::debug!(sequence, attempt = self.attempts, ?delay, "scheduling retry");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            replay();
        }));
        true
    }
}

impl Drop for RetryScheduler {
    fn drop(&mut self) {
        if let Some(task) = self.pending.take() {
            task.abort();
        }
    }
}
