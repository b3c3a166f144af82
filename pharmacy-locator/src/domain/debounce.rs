//! Cancel-and-replace debouncing for camera movement.
//!
//! Camera events arrive at frame rate. Each [`DebounceScheduler::schedule`]
//! call aborts the pending timer and arms a new one, so only the last value
//! seen before a full quiet window is delivered.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Quiet period used by the map camera debouncer.
pub const DEFAULT_QUIESCENCE_WINDOW: Duration = Duration::from_millis(800);

/// Delivers at most one value per quiet window to an output channel.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug)]
pub struct DebounceScheduler<T> {
    window: Duration,
    output: mpsc::UnboundedSender<T>,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> DebounceScheduler<T> {
    /// Create a scheduler that forwards fired values to `output`.
    pub fn new(window: Duration, output: mpsc::UnboundedSender<T>) -> Self {
        Self {
            window,
            output,
            pending: None,
        }
    }

    /// Quiet period before a scheduled value fires.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace any pending value with `value` and restart the quiet window.
    pub fn schedule(&mut self, value: T) {
        self.cancel();
        let window = self.window;
        let output = self.output.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            if output.send(value).is_err() {
                debug!("debounce receiver dropped before delivery");
            }
        }));
    }

    /// Drop the pending value, if any, without delivering it.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// Whether a value is waiting for its window to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }
}

impl<T> Drop for DebounceScheduler<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
