//! Transport port: the network-facing send/receive primitive.

use async_trait::async_trait;

use crate::{Message, OutboxResult, ShutdownToken, TransactionContext};

/// Physical transport used to actually deliver messages.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Create the queue backing `address` if it does not already exist.
    fn create_queue(&self, address: &str) -> OutboxResult<()>;

    /// Send `message` to `destination` under the given transaction.
    async fn send(
        &self,
        destination: &str,
        message: Message,
        context: &TransactionContext,
    ) -> OutboxResult<()>;

    /// Receive the next incoming message, waiting until one arrives or
    /// `shutdown` fires.
    async fn receive(
        &self,
        context: &TransactionContext,
        shutdown: &ShutdownToken,
    ) -> OutboxResult<Option<Message>>;

    /// The transport's own input queue address.
    fn address(&self) -> &str;
}
