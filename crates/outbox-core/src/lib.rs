//! Core types and collaborator ports for the transactional outbox.
//!
//! This crate provides:
//! - `Message`: transport message with string headers and an opaque payload
//! - `TransactionContext`: unit-of-work scope with commit hooks and item slots
//! - Ports: `Transport`, `OutboxStorage`/`StoredBatch`, `BackoffPolicy`
//! - `ExponentialBackoff`: default idle-wait policy
//! - `MemoryOutboxStorage`: in-memory storage with transactional batch dequeue

mod error;
mod message;
mod shutdown;
mod transaction;

pub mod backoff;
pub mod headers;
pub mod memory;
pub mod storage;
pub mod transport;

pub use backoff::{BackoffPolicy, ExponentialBackoff};
pub use error::{OutboxError, OutboxResult};
pub use memory::{MemoryBatch, MemoryOutboxStorage};
pub use message::Message;
pub use shutdown::ShutdownToken;
pub use storage::{OutboxStorage, StoredBatch};
pub use transaction::TransactionContext;
pub use transport::Transport;
