//! Transport decorator that defers outgoing sends into the outbox.
//!
//! [`OutboxTransport`] wraps a [`Transport`] so that sends are buffered
//! against the active transaction and flushed to [`OutboxStorage`] when it
//! commits, instead of hitting the network inline. `create_queue`, `receive`
//! and `address` pass straight through to the wrapped transport.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;

use outbox_core::{
    headers, Message, OutboxResult, OutboxStorage, ShutdownToken, TransactionContext, Transport,
};

/// Transaction item key under which the pending batch is stored.
pub const OUTGOING_MESSAGES_KEY: &str = "outbox-outgoing-messages";

/// Messages buffered against one transaction, flushed once on commit.
#[derive(Default)]
struct PendingBatch {
    messages: Mutex<Vec<Message>>,
}

impl PendingBatch {
    fn push(&self, message: Message) {
        self.messages.lock().expect("lock poisoned").push(message);
    }

    fn drain(&self) -> Vec<Message> {
        std::mem::take(&mut *self.messages.lock().expect("lock poisoned"))
    }
}

/// Decorator that converts outgoing sends into deferred outbox writes.
///
/// The first `send` within a transaction registers a commit hook; on commit
/// the buffered messages are stored in their original send order. A rolled
/// back transaction never touches storage.
pub struct OutboxTransport<T, S> {
    transport: Arc<T>,
    storage: Arc<S>,
}

impl<T, S> OutboxTransport<T, S> {
    /// Wrap `transport`, persisting deferred sends into `storage`.
    pub fn new(transport: Arc<T>, storage: Arc<S>) -> Self {
        Self { transport, storage }
    }
}

#[async_trait]
impl<T, S> Transport for OutboxTransport<T, S>
where
    T: Transport,
    S: OutboxStorage,
{
    fn create_queue(&self, address: &str) -> OutboxResult<()> {
        self.transport.create_queue(address)
    }

    async fn send(
        &self,
        destination: &str,
        mut message: Message,
        context: &TransactionContext,
    ) -> OutboxResult<()> {
        let batch = context.get_or_insert_with(OUTGOING_MESSAGES_KEY, || {
            let batch = Arc::new(PendingBatch::default());

            let storage = Arc::clone(&self.storage);
            let buffered = Arc::clone(&batch);
            context.on_committed(move || store_buffered(storage, buffered));

            batch
        });

        message
            .headers
            .insert(headers::RECIPIENT.to_string(), destination.to_string());
        batch.push(message);

        debug!(destination = %destination, "Deferred send into outbox");
        Ok(())
    }

    async fn receive(
        &self,
        context: &TransactionContext,
        shutdown: &ShutdownToken,
    ) -> OutboxResult<Option<Message>> {
        self.transport.receive(context, shutdown).await
    }

    fn address(&self) -> &str {
        self.transport.address()
    }
}

/// Commit hook body: flush the buffered messages to storage in send order.
async fn store_buffered<S: OutboxStorage>(
    storage: Arc<S>,
    batch: Arc<PendingBatch>,
) -> OutboxResult<()> {
    for message in batch.drain() {
        storage.store(message).await?;
    }
    Ok(())
}
