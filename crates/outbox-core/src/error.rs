//! Error types for the outbox crates.

use thiserror::Error;

/// Error type shared by the outbox components and their collaborators.
#[derive(Debug, Error)]
pub enum OutboxError {
    /// Outbox storage failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// The underlying transport failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A stored message had no recipient header to forward it with.
    #[error("Stored message has no recipient header")]
    MissingRecipient,

    /// The transaction context was completed more than once.
    #[error("Transaction context already completed")]
    AlreadyCompleted,

    /// A cancellable wait was interrupted by the shutdown signal.
    ///
    /// This is the cooperative-shutdown marker, not a failure; callers
    /// observing it while their shutdown token is cancelled should unwind
    /// quietly.
    #[error("Shutdown requested")]
    Shutdown,

    /// Invalid configuration detected during setup.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using OutboxError.
pub type OutboxResult<T> = Result<T, OutboxError>;
