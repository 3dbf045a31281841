//! End-to-end flow: deferred sends committed into the outbox are redelivered
//! through the real transport by the background processor.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::{sleep, timeout, Duration};

use outbox_core::{
    headers, ExponentialBackoff, MemoryOutboxStorage, Message, OutboxResult, ShutdownToken,
    TransactionContext, Transport,
};
use outbox_processor::{configure_outbox, OutboxOptions};

/// Transport double recording every forwarded message.
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<(String, Message)>>,
}

impl RecordingTransport {
    fn sent(&self) -> Vec<(String, Message)> {
        self.sent.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn create_queue(&self, _address: &str) -> OutboxResult<()> {
        Ok(())
    }

    async fn send(
        &self,
        destination: &str,
        message: Message,
        _context: &TransactionContext,
    ) -> OutboxResult<()> {
        self.sent
            .lock()
            .expect("lock poisoned")
            .push((destination.to_string(), message));
        Ok(())
    }

    async fn receive(
        &self,
        _context: &TransactionContext,
        _shutdown: &ShutdownToken,
    ) -> OutboxResult<Option<Message>> {
        Ok(None)
    }

    fn address(&self) -> &str {
        "input-queue"
    }
}

async fn wait_for_sends(transport: &RecordingTransport, count: usize) {
    timeout(Duration::from_secs(5), async {
        while transport.sent().len() < count {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("processor should forward the committed messages");
}

#[tokio::test]
async fn committed_sends_are_redelivered_through_the_transport() {
    let transport = Arc::new(RecordingTransport::default());
    let storage = MemoryOutboxStorage::new();
    let shutdown = ShutdownToken::new();

    let setup = configure_outbox(
        Arc::clone(&transport),
        Arc::new(storage.clone()),
        Arc::new(ExponentialBackoff::default()),
        OutboxOptions::default(),
        shutdown,
    )
    .unwrap();

    // producer side: two sends inside one committed unit of work
    let context = TransactionContext::new();
    setup
        .transport
        .send("orders", Message::new(b"m1".to_vec()), &context)
        .await
        .unwrap();
    setup
        .transport
        .send("billing", Message::new(b"m2".to_vec()), &context)
        .await
        .unwrap();

    assert!(transport.sent().is_empty());
    context.complete().await.unwrap();

    // processor side: both messages come out in order, recipients stripped
    wait_for_sends(&transport, 2).await;
    let sent = transport.sent();
    assert_eq!(sent[0].0, "orders");
    assert_eq!(sent[0].1.payload, b"m1");
    assert!(!sent[0].1.headers.contains_key(headers::RECIPIENT));
    assert_eq!(sent[1].0, "billing");
    assert_eq!(sent[1].1.payload, b"m2");
    assert!(!sent[1].1.headers.contains_key(headers::RECIPIENT));

    assert_eq!(storage.pending_count(), 0);

    let handle = setup.processor.expect("processor runs by default");
    timeout(Duration::from_secs(1), handle.shutdown_and_join())
        .await
        .expect("processor should stop on shutdown");
}

#[tokio::test]
async fn rolled_back_work_is_never_redelivered() {
    let transport = Arc::new(RecordingTransport::default());
    let storage = MemoryOutboxStorage::new();
    let shutdown = ShutdownToken::new();

    let setup = configure_outbox(
        Arc::clone(&transport),
        Arc::new(storage.clone()),
        Arc::new(ExponentialBackoff::default()),
        OutboxOptions::default(),
        shutdown,
    )
    .unwrap();

    {
        let context = TransactionContext::new();
        setup
            .transport
            .send("orders", Message::new(b"discarded".to_vec()), &context)
            .await
            .unwrap();
        // dropped without complete: rollback
    }

    // the processor keeps idling; nothing ever reaches storage or the wire
    sleep(Duration::from_millis(100)).await;
    assert!(transport.sent().is_empty());
    assert_eq!(storage.pending_count(), 0);

    let handle = setup.processor.expect("processor runs by default");
    timeout(Duration::from_secs(1), handle.shutdown_and_join())
        .await
        .expect("processor should stop on shutdown");
}
