//! Cooperative shutdown signal shared by background workers.

use std::sync::Arc;

use tokio::sync::watch;

/// Clonable shutdown token backed by a watch channel.
///
/// All clones observe the same signal; `cancel` is idempotent. Background
/// loops poll `is_cancelled` between iterations and race `cancelled` against
/// their suspension points.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    sender: Arc<watch::Sender<bool>>,
    receiver: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Create a fresh, un-cancelled token.
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
            receiver,
        }
    }

    /// Signal shutdown to every clone of this token.
    pub fn cancel(&self) {
        // ignore send error: all receivers are clones of ours, so it cannot fail
        let _ = self.sender.send(true);
    }

    /// Whether shutdown has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolves once shutdown is signalled; immediately if it already was.
    pub async fn cancelled(&self) {
        let mut receiver = self.receiver.clone();
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn starts_uncancelled() {
        let token = ShutdownToken::new();
        assert!(!token.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_is_visible_to_clones() {
        let token = ShutdownToken::new();
        let clone = token.clone();

        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_wakes_pending_waiter() {
        let token = ShutdownToken::new();
        let waiter = token.clone();

        let wait = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();

        timeout(Duration::from_secs(1), wait)
            .await
            .expect("waiter should wake after cancel")
            .expect("waiter task should not panic");
    }

    #[tokio::test]
    async fn cancelled_returns_immediately_when_already_cancelled() {
        let token = ShutdownToken::new();
        token.cancel();

        timeout(Duration::from_millis(100), token.cancelled())
            .await
            .expect("already-cancelled token should not block");
    }
}
