mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{DONE, FAILED, assert_quiet, next_event, scratch_client};
use parking_lot::Mutex;
use regxact::{
    Client, ClientConfig, CompletionEvent, EVENT_ID_NONE, EventCounter, IoEntry,
    ScratchRegisters, Subscribe, SubmitError, TransactionInfo,
};

fn read_on(event_id: i64, counter: EventCounter) -> TransactionInfo {
    TransactionInfo::builder()
        .on_event(1, event_id, counter)
        .entry(IoEntry::read(0, 0))
        .emit_success(DONE)
        .emit_error(FAILED)
        .build()
}

fn immediate_read() -> TransactionInfo {
    TransactionInfo::builder()
        .entry(IoEntry::read(0, 0))
        .emit_success(DONE)
        .emit_error(FAILED)
        .build()
}

#[tokio::test]
async fn cancelled_transaction_never_completes() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let id = client.submit(read_on(7, EventCounter::Exactly(1))).unwrap();
    client.cancel(id).unwrap();
    assert_eq!(client.cancel(id), Err(SubmitError::NotFound { id }));

    client.on_event(7, 1);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn cancel_after_completion_is_not_found() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let id = client.submit(immediate_read()).unwrap();
    assert_eq!(next_event(&mut rx).await.transaction_id(), id);
    assert_eq!(client.cancel(id), Err(SubmitError::NotFound { id }));
    assert_eq!(client.cancel(999), Err(SubmitError::NotFound { id: 999 }));
}

#[tokio::test]
async fn replace_swaps_a_pending_transaction() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let old = client.submit(read_on(7, EventCounter::NextOccurrence)).unwrap();
    let new = client.replace(old, read_on(8, EventCounter::NextOccurrence)).unwrap();
    assert_ne!(old, new);

    client.on_event(7, 0);
    assert_quiet(&mut rx).await;
    client.on_event(8, 0);
    assert_eq!(next_event(&mut rx).await.transaction_id(), new);

    let err = client.replace(old, immediate_read()).unwrap_err();
    assert_eq!(err, SubmitError::NotFound { id: old });
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn invalid_replacement_keeps_the_original() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let old = client.submit(read_on(7, EventCounter::NextOccurrence)).unwrap();
    let empty = TransactionInfo::builder().emit_success(DONE).build();
    let err = client.replace(old, empty).unwrap_err();
    assert_eq!(err.as_label(), "submit_invalid_argument");

    client.on_event(7, 0);
    assert_eq!(next_event(&mut rx).await.transaction_id(), old);
}

#[tokio::test]
async fn rejected_submissions_consume_no_id() {
    let cfg = ClientConfig {
        max_entries: 4,
        max_response_bytes: 128,
        ..ClientConfig::default()
    };
    let (_regs, client) = scratch_client(cfg);

    let empty = TransactionInfo::builder().build();
    assert!(matches!(
        client.submit(empty),
        Err(SubmitError::InvalidArgument { .. })
    ));

    let too_many = TransactionInfo::builder()
        .entries((0..5).map(|i| IoEntry::write(0, i * 4, 0)))
        .build();
    assert!(matches!(
        client.submit(too_many),
        Err(SubmitError::InvalidArgument { .. })
    ));

    let too_large = TransactionInfo::builder()
        .entry(IoEntry::ReadBatch {
            bank: 0,
            offset: 0,
            size: 0x80,
        })
        .build();
    assert!(matches!(
        client.submit(too_large),
        Err(SubmitError::ResourceExhausted { limit: 128, .. })
    ));

    let no_trigger = TransactionInfo::builder()
        .on_event(1, EVENT_ID_NONE, EventCounter::NextOccurrence)
        .entry(IoEntry::read(0, 0))
        .build();
    assert!(client.submit(no_trigger).is_err());

    assert_eq!(client.submit(immediate_read()).unwrap(), 0);
}

#[tokio::test]
async fn shutdown_cancels_queued_work() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    client.submit(read_on(7, EventCounter::Exactly(2))).unwrap();
    client.submit(read_on(7, EventCounter::NextOccurrence)).unwrap();
    client.submit(read_on(9, EventCounter::NextOccurrence)).unwrap();
    assert_eq!(client.pending(), 3);

    assert_eq!(client.shutdown().await, 3);
    assert!(client.is_closed());
    assert_eq!(client.pending(), 0);
    assert_eq!(client.submit(immediate_read()), Err(SubmitError::Closed));

    client.on_event(7, 2);
    assert_quiet(&mut rx).await;
    assert_eq!(client.shutdown().await, 0);
}

#[tokio::test]
async fn shutdown_waits_for_in_flight_pass() {
    let (regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();
    client.register_io(&[IoEntry::write(0, 0x8, 0x1)]).unwrap();

    let info = TransactionInfo::builder()
        .entry(IoEntry::poll(0, 0x8, 0x0, 0x1, Duration::from_millis(30)))
        .entry(IoEntry::write(0, 0x10, 0x7))
        .emit_success(DONE)
        .emit_error(FAILED)
        .build();
    let id = client.submit(info).unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert_eq!(client.shutdown().await, 0);
    let ev = rx.try_recv().unwrap();
    assert_eq!(ev.transaction_id(), id);
    assert_eq!(ev.event_id, FAILED);
    assert_eq!(ev.payload.error_code, -110);
    assert_eq!(regs.snapshot(0).unwrap()[0x10], 0);
}

/// Collects completion events it accepts.
#[derive(Default)]
struct Collector {
    seen: Mutex<Vec<(i64, i64)>>,
}

#[async_trait]
impl Subscribe for Collector {
    async fn on_event(&self, ev: &CompletionEvent) {
        self.seen.lock().push((ev.event_id, ev.transaction_id()));
    }

    fn accepts(&self, event_id: i64) -> bool {
        event_id == FAILED
    }

    fn name(&self) -> &'static str {
        "collector"
    }
}

#[tokio::test]
async fn subscribers_receive_accepted_events() {
    let collector = Arc::new(Collector::default());
    let regs = Arc::new(ScratchRegisters::new(&[0x10]));
    let subs: Vec<Arc<dyn Subscribe>> = vec![collector.clone()];
    let client = Client::builder(ClientConfig::default(), regs)
        .with_subscribers(subs)
        .build();
    let mut rx = client.subscribe();

    client.submit(immediate_read()).unwrap();
    let failing = TransactionInfo::builder()
        .entry(IoEntry::read(5, 0))
        .emit_success(DONE)
        .emit_error(FAILED)
        .build();
    let bad = client.submit(failing).unwrap();

    next_event(&mut rx).await;
    next_event(&mut rx).await;
    client.shutdown().await;

    assert_eq!(*collector.seen.lock(), vec![(FAILED, bad)]);
}
