//! The outbox redelivery loop.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use outbox_core::{
    headers, BackoffPolicy, OutboxError, OutboxResult, OutboxStorage, ShutdownToken, StoredBatch,
    TransactionContext, Transport,
};

/// Background worker that repeatedly drains the outbox and forwards the
/// stored messages through the real transport.
///
/// One processor runs exactly one loop: batches are processed strictly
/// sequentially, and messages within a batch are forwarded in retrieval
/// order. The loop runs until its shutdown token fires; a failing iteration
/// is logged and the next one starts immediately, so a sustained storage or
/// transport outage shows up as repeated log entries and stalled redelivery,
/// never as a dead task.
pub struct OutboxProcessor<T, S, B> {
    max_messages_to_retrieve: usize,
    transport: Arc<T>,
    storage: Arc<S>,
    backoff: Arc<B>,
    shutdown: ShutdownToken,
}

impl<T, S, B> OutboxProcessor<T, S, B>
where
    T: Transport,
    S: OutboxStorage,
    B: BackoffPolicy,
{
    /// Create a processor; nothing runs until [`run`](Self::run).
    pub fn new(
        max_messages_to_retrieve: usize,
        transport: Arc<T>,
        storage: Arc<S>,
        backoff: Arc<B>,
        shutdown: ShutdownToken,
    ) -> Self {
        Self {
            max_messages_to_retrieve,
            transport,
            storage,
            backoff,
            shutdown,
        }
    }

    /// Launch the processing loop and return immediately.
    pub fn run(self) -> ProcessorHandle {
        let shutdown = self.shutdown.clone();
        let join = tokio::spawn(self.process_outbox_messages());
        ProcessorHandle { join, shutdown }
    }

    async fn process_outbox_messages(self) {
        debug!("Starting outbox message processor");

        while !self.shutdown.is_cancelled() {
            match self.process_next_batch().await {
                Ok(()) => {}
                Err(OutboxError::Shutdown) => {
                    // cooperative shutdown; the loop condition ends the task
                }
                Err(error) => {
                    error!(error = %error, "Unhandled error in outbox message processor");
                }
            }
        }

        debug!("Outbox message processor stopped");
    }

    /// Run one loop iteration: retrieve a batch, forward it, finalize storage.
    ///
    /// An empty batch waits on the backoff policy; a non-empty batch is
    /// forwarded in retrieval order under one transaction context, then the
    /// batch commit removes the entries and the backoff resets. Any error
    /// abandons the iteration, rolling the reservation back.
    pub async fn process_next_batch(&self) -> OutboxResult<()> {
        let batch = tokio::select! {
            _ = self.shutdown.cancelled() => return Err(OutboxError::Shutdown),
            batch = self
                .storage
                .retrieve(&self.shutdown, self.max_messages_to_retrieve) => batch?,
        };

        if batch.is_empty() {
            drop(batch);
            self.backoff.wait_no_message(&self.shutdown).await;
            return Ok(());
        }

        let context = TransactionContext::new();
        for stored in batch.messages() {
            let mut message = stored.clone();
            let destination = message
                .headers
                .remove(headers::RECIPIENT)
                .ok_or(OutboxError::MissingRecipient)?;
            self.transport.send(&destination, message, &context).await?;
        }
        context.complete().await?;
        batch.commit().await?;

        self.backoff.reset();
        Ok(())
    }
}

/// Handle to a running processor.
///
/// Loop failures never surface here; the handle only reflects lifecycle.
pub struct ProcessorHandle {
    join: JoinHandle<()>,
    shutdown: ShutdownToken,
}

impl ProcessorHandle {
    /// Token observed by the loop; cancelling it stops the processor.
    pub fn shutdown_token(&self) -> &ShutdownToken {
        &self.shutdown
    }

    /// Request shutdown without waiting for the loop to finish.
    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Request shutdown and wait for the loop to finish.
    pub async fn shutdown_and_join(self) {
        self.shutdown.cancel();
        // ignore join error: the loop contains its own failures
        let _ = self.join.await;
    }

    /// Wait for the loop to finish without requesting shutdown.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}
