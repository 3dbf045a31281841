//! Configuration surface for enabling the outbox on a transport.

use std::sync::Arc;

use outbox_core::{
    BackoffPolicy, OutboxError, OutboxResult, OutboxStorage, ShutdownToken, Transport,
};
use outbox_transport::OutboxTransport;

use crate::{OutboxProcessor, ProcessorHandle};

/// Options controlling the outbox processor.
#[derive(Debug, Clone)]
pub struct OutboxOptions {
    /// Whether to run the background processor at all.
    ///
    /// Disable it on nodes that should only produce into the outbox while
    /// another process drains it.
    pub run_messages_processor: bool,
    /// Max number of messages to retrieve from the outbox and send through
    /// the transport in a single batch.
    pub max_messages_to_retrieve: usize,
}

impl Default for OutboxOptions {
    fn default() -> Self {
        Self {
            run_messages_processor: true,
            max_messages_to_retrieve: 10,
        }
    }
}

/// Result of [`configure_outbox`]: the decorated transport plus the
/// processor handle, if one was started.
pub struct OutboxSetup<T, S> {
    /// Transport whose sends are deferred into the outbox.
    pub transport: OutboxTransport<T, S>,
    /// Handle to the background processor, `None` when it was not started.
    pub processor: Option<ProcessorHandle>,
}

/// Decorate `transport` with the outbox and optionally start the processor.
///
/// Options are validated synchronously; on an invalid configuration nothing
/// is spawned and the error surfaces here rather than at runtime.
pub fn configure_outbox<T, S, B>(
    transport: Arc<T>,
    storage: Arc<S>,
    backoff: Arc<B>,
    options: OutboxOptions,
    shutdown: ShutdownToken,
) -> OutboxResult<OutboxSetup<T, S>>
where
    T: Transport,
    S: OutboxStorage,
    B: BackoffPolicy,
{
    if options.max_messages_to_retrieve == 0 {
        return Err(OutboxError::Config(
            "max_messages_to_retrieve must be positive".to_string(),
        ));
    }

    let processor = if options.run_messages_processor {
        let processor = OutboxProcessor::new(
            options.max_messages_to_retrieve,
            Arc::clone(&transport),
            Arc::clone(&storage),
            backoff,
            shutdown,
        );
        Some(processor.run())
    } else {
        None
    };

    Ok(OutboxSetup {
        transport: OutboxTransport::new(transport, storage),
        processor,
    })
}
