//! Outbox storage port.

use async_trait::async_trait;

use crate::{Message, OutboxResult, ShutdownToken};

/// Durable queue holding deferred messages until the processor forwards them.
///
/// `store` is only ever invoked from a post-commit hook; a stored message
/// becomes visible to `retrieve` once `store` returns successfully.
#[async_trait]
pub trait OutboxStorage: Send + Sync + 'static {
    /// Batch handle returned by [`retrieve`](Self::retrieve).
    type Batch: StoredBatch;

    /// Durably append one message.
    async fn store(&self, message: Message) -> OutboxResult<()>;

    /// Dequeue up to `max_messages` of the oldest available entries.
    ///
    /// The entries stay reserved while the batch is outstanding: committing
    /// it removes them permanently, dropping it returns them for a later
    /// retrieve. Implementations that block waiting for entries must honor
    /// `shutdown` and return [`OutboxError::Shutdown`](crate::OutboxError::Shutdown)
    /// when it fires.
    async fn retrieve(
        &self,
        shutdown: &ShutdownToken,
        max_messages: usize,
    ) -> OutboxResult<Self::Batch>;
}

/// A reserved batch of stored messages.
///
/// Commit and forwarding resolve as one outcome: the processor forwards every
/// message, then commits the batch. Dropping the batch without committing
/// rolls the reservation back.
#[async_trait]
pub trait StoredBatch: Send {
    /// The reserved messages, oldest first.
    fn messages(&self) -> &[Message];

    /// Whether the batch holds no messages.
    fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }

    /// Permanently remove the reserved entries from storage.
    async fn commit(self) -> OutboxResult<()>;
}
