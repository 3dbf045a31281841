//! In-memory outbox storage with transactional batch dequeue.
//!
//! Intended for tests and single-process deployments. Retrieved entries stay
//! reserved while the batch is outstanding: committing the batch removes them
//! permanently, dropping it returns them to the front of the queue in their
//! original order.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::storage::{OutboxStorage, StoredBatch};
use crate::{Message, OutboxResult, ShutdownToken};

/// One queued message plus bookkeeping.
#[derive(Debug, Clone)]
struct StoredEntry {
    message: Message,
    enqueued_at: DateTime<Utc>,
}

/// In-memory [`OutboxStorage`] implementation.
///
/// Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct MemoryOutboxStorage {
    queue: Arc<Mutex<VecDeque<StoredEntry>>>,
}

impl MemoryOutboxStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued entries, not counting reserved batches.
    pub fn pending_count(&self) -> usize {
        self.queue.lock().expect("lock poisoned").len()
    }
}

#[async_trait]
impl OutboxStorage for MemoryOutboxStorage {
    type Batch = MemoryBatch;

    async fn store(&self, message: Message) -> OutboxResult<()> {
        let mut queue = self.queue.lock().expect("lock poisoned");
        queue.push_back(StoredEntry {
            message,
            enqueued_at: Utc::now(),
        });
        debug!(pending = queue.len(), "Stored outbox message");
        Ok(())
    }

    async fn retrieve(
        &self,
        _shutdown: &ShutdownToken,
        max_messages: usize,
    ) -> OutboxResult<MemoryBatch> {
        let mut queue = self.queue.lock().expect("lock poisoned");
        let count = queue.len().min(max_messages);
        let entries: Vec<StoredEntry> = queue.drain(..count).collect();
        drop(queue);

        let batch_id = Uuid::new_v4().to_string();
        if !entries.is_empty() {
            debug!(
                batch_id = %batch_id,
                count = entries.len(),
                oldest_enqueued_at = %entries[0].enqueued_at,
                "Reserved outbox batch"
            );
        }

        Ok(MemoryBatch {
            batch_id,
            messages: entries.iter().map(|entry| entry.message.clone()).collect(),
            entries,
            queue: Arc::clone(&self.queue),
        })
    }
}

/// A batch of reserved in-memory entries.
///
/// Dropping the batch without committing restores the entries to the front
/// of the queue.
pub struct MemoryBatch {
    batch_id: String,
    messages: Vec<Message>,
    entries: Vec<StoredEntry>,
    queue: Arc<Mutex<VecDeque<StoredEntry>>>,
}

impl MemoryBatch {
    /// Identifier correlating log lines about this batch.
    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }
}

#[async_trait]
impl StoredBatch for MemoryBatch {
    fn messages(&self) -> &[Message] {
        &self.messages
    }

    async fn commit(mut self) -> OutboxResult<()> {
        let count = self.entries.len();
        self.entries.clear();
        debug!(batch_id = %self.batch_id, count = count, "Committed outbox batch");
        Ok(())
    }
}

impl Drop for MemoryBatch {
    fn drop(&mut self) {
        if self.entries.is_empty() {
            return;
        }

        let mut queue = self.queue.lock().expect("lock poisoned");
        for entry in self.entries.drain(..).rev() {
            queue.push_front(entry);
        }
        warn!(batch_id = %self.batch_id, "Outbox batch rolled back");
    }
}
