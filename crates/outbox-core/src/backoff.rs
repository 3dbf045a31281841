//! Backoff policy for idle waits between empty outbox polls.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::ShutdownToken;

/// Controls how long the processor idles when the outbox turns up empty.
#[async_trait]
pub trait BackoffPolicy: Send + Sync + 'static {
    /// Wait before the next poll. Returns early if `shutdown` fires.
    async fn wait_no_message(&self, shutdown: &ShutdownToken);

    /// Clear accumulated delay state after a batch was processed.
    fn reset(&self);
}

/// Exponential backoff with a cap.
///
/// Every idle wait doubles the next delay up to `max_delay`; `reset` drops
/// back to `initial_delay`.
#[derive(Debug)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    current: Mutex<Duration>,
}

impl ExponentialBackoff {
    /// Create a policy starting at `initial_delay` and capped at `max_delay`.
    pub fn new(initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            max_delay,
            current: Mutex::new(initial_delay),
        }
    }

    fn next_delay(&self) -> Duration {
        let mut current = self.current.lock().expect("lock poisoned");
        let delay = *current;
        *current = (*current * 2).min(self.max_delay);
        delay
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(30))
    }
}

#[async_trait]
impl BackoffPolicy for ExponentialBackoff {
    async fn wait_no_message(&self, shutdown: &ShutdownToken) {
        let delay = self.next_delay();
        tokio::select! {
            _ = shutdown.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }

    fn reset(&self) {
        *self.current.lock().expect("lock poisoned") = self.initial_delay;
    }
}
