mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use common::{
    DONE, FAILED, FaultyRegisters, PanickingRegisters, assert_quiet, next_event, scratch_client,
};
use regxact::{
    Client, ClientConfig, EventCounter, IoEntry, ScratchRegisters, SubmitError, TransactionInfo,
    TransactionResponse,
};

fn on_frame(counter: EventCounter) -> regxact::TransactionInfoBuilder {
    TransactionInfo::builder()
        .on_event(1, 7, counter)
        .emit_success(DONE)
        .emit_error(FAILED)
}

#[tokio::test]
async fn immediate_write_then_read() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let info = TransactionInfo::builder()
        .entry(IoEntry::write(0, 0x4, 0xff))
        .entry(IoEntry::read(0, 0x4))
        .emit_success(DONE)
        .emit_error(FAILED)
        .build();
    let id = client.submit(info).unwrap();

    let ev = next_event(&mut rx).await;
    assert_eq!(ev.event_id, DONE);
    assert_eq!(ev.transaction_id(), id);
    assert_eq!(ev.payload.error_code, 0);
    assert_eq!(ev.payload.num_entries, 1);
    assert_eq!(ev.payload.completion_index, 1);
    assert_eq!(ev.payload.results[0].bank, 0);
    assert_eq!(ev.payload.results[0].offset, 0x4);
    assert_eq!(ev.payload.results[0].value(), 0xff);

    let wire = ev.payload.encode();
    assert_eq!(wire.len(), ev.payload.encoded_len());
    assert_eq!(TransactionResponse::decode(&wire).unwrap(), *ev.payload);
}

#[tokio::test]
async fn exact_counter_fires_once() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let id = client
        .submit(on_frame(EventCounter::Exactly(3)).entry(IoEntry::read(0, 0)).build())
        .unwrap();

    client.on_event(7, 1);
    client.on_event(7, 2);
    client.on_event(8, 3);
    assert_quiet(&mut rx).await;
    assert_eq!(client.pending(), 1);

    client.on_event(7, 3);
    let ev = next_event(&mut rx).await;
    assert_eq!(ev.transaction_id(), id);
    assert_eq!(ev.event_id, DONE);

    client.on_event(7, 3);
    assert_quiet(&mut rx).await;
    assert_eq!(client.pending(), 0);
    assert_eq!(client.event_counter(7), Some(3));
    assert_eq!(client.event_counter(8), Some(3));
}

#[tokio::test]
async fn next_occurrence_fires_on_any_counter() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let id = client
        .submit(
            on_frame(EventCounter::from_raw(EventCounter::ON_NEXT_OCCURRENCE))
                .entry(IoEntry::read(0, 0))
                .build(),
        )
        .unwrap();

    client.on_event(7, 41);
    assert_eq!(next_event(&mut rx).await.transaction_id(), id);
    client.on_event(7, 42);
    assert_quiet(&mut rx).await;
}

#[tokio::test]
async fn past_counter_drops_without_event() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let late = client
        .submit(on_frame(EventCounter::Exactly(2)).entry(IoEntry::read(0, 0)).build())
        .unwrap();
    let future = client
        .submit(on_frame(EventCounter::Exactly(9)).entry(IoEntry::read(0, 0)).build())
        .unwrap();

    client.on_event(7, 5);
    assert_quiet(&mut rx).await;
    assert_eq!(client.pending(), 1);
    assert!(client.cancel(late).is_err());

    client.on_event(7, 9);
    assert_eq!(next_event(&mut rx).await.transaction_id(), future);
}

#[tokio::test]
async fn one_event_completes_in_submission_order() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let ids: Vec<i64> = (0..5u64)
        .map(|i| {
            let info = on_frame(EventCounter::NextOccurrence)
                .entry(IoEntry::write(0, i * 4, i))
                .entry(IoEntry::read(0, i * 4))
                .build();
            client.submit(info).unwrap()
        })
        .collect();

    client.on_event(7, 0);
    let mut seen = Vec::new();
    for _ in 0..5 {
        let ev = next_event(&mut rx).await;
        assert_eq!(ev.payload.results[0].value() as i64, ev.transaction_id() - ids[0]);
        seen.push(ev.transaction_id());
    }
    assert_eq!(seen, ids);
}

#[tokio::test]
async fn inline_transaction_completes_before_on_event_returns() {
    let (regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let info = on_frame(EventCounter::NextOccurrence)
        .entry(IoEntry::write(1, 0x10, 0x1234))
        .entry(IoEntry::read(1, 0x10))
        .run_in_event_context()
        .build();
    let id = client.submit(info).unwrap();

    client.on_event(7, 0);
    let ev = rx.try_recv().unwrap();
    assert_eq!(ev.transaction_id(), id);
    assert_eq!(ev.payload.results[0].value(), 0x1234);
    assert_eq!(&regs.snapshot(1).unwrap()[0x10..0x12], &[0x34, 0x12]);
}

#[tokio::test]
async fn poll_timeout_reports_error_event() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();

    let info = on_frame(EventCounter::NextOccurrence)
        .entry(IoEntry::write(0, 0, 0x1))
        .entry(IoEntry::poll(0, 0x8, 0x80, 0x80, Duration::from_millis(2)))
        .entry(IoEntry::write(0, 0x4, 0x1))
        .run_in_event_context()
        .build();
    client.submit(info).unwrap();

    client.on_event(7, 0);
    let ev = rx.try_recv().unwrap();
    assert_eq!(ev.event_id, FAILED);
    assert_eq!(ev.payload.error_code, -110);
    assert_eq!(ev.payload.completion_index, 0);
    assert_eq!(client.register_io(&[IoEntry::read(0, 0x4)]).unwrap()[0].value(), 0);
}

#[tokio::test]
async fn poll_matches_masked_value() {
    let (regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();
    client.register_io(&[IoEntry::write(0, 0x8, 0x81)]).unwrap();

    let info = TransactionInfo::builder()
        .entry(IoEntry::poll(0, 0x8, 0x80, 0x80, Duration::from_millis(100)))
        .entry(IoEntry::modify(0, 0x8, 0x0, 0x1))
        .emit_success(DONE)
        .emit_error(FAILED)
        .build();
    client.submit(info).unwrap();

    assert_eq!(next_event(&mut rx).await.event_id, DONE);
    assert_eq!(regs.snapshot(0).unwrap()[0x8], 0x80);
}

#[tokio::test]
async fn failing_transaction_does_not_affect_siblings() {
    let regs = Arc::new(FaultyRegisters::new(&[0x100], 9, -5));
    let client = Client::builder(ClientConfig::default(), regs.clone()).build();
    let mut rx = client.subscribe();

    let bad = client
        .submit(
            on_frame(EventCounter::NextOccurrence)
                .entry(IoEntry::write(0, 0, 1))
                .entry(IoEntry::read(9, 0))
                .entry(IoEntry::write(0, 4, 2))
                .build(),
        )
        .unwrap();
    let good = client
        .submit(
            on_frame(EventCounter::NextOccurrence)
                .entry(IoEntry::write(0, 8, 3))
                .build(),
        )
        .unwrap();

    client.on_event(7, 0);
    let first = next_event(&mut rx).await;
    assert_eq!(first.transaction_id(), bad);
    assert_eq!(first.event_id, FAILED);
    assert_eq!(first.payload.error_code, -5);
    assert_eq!(first.payload.completion_index, 0);

    let second = next_event(&mut rx).await;
    assert_eq!(second.transaction_id(), good);
    assert_eq!(second.event_id, DONE);
    assert_eq!(second.payload.num_entries, 0);

    let mem = regs.inner.snapshot(0).unwrap();
    assert_eq!((mem[0], mem[4], mem[8]), (1, 0, 3));
}

#[tokio::test]
async fn panicking_backend_fails_only_its_transaction() {
    let regs = Arc::new(PanickingRegisters {
        inner: ScratchRegisters::new(&[0x100]),
        panic_bank: 9,
    });
    let client = Client::builder(ClientConfig::default(), regs.clone()).build();
    let mut rx = client.subscribe();

    let bad = client
        .submit(
            on_frame(EventCounter::NextOccurrence)
                .entry(IoEntry::write(0, 0, 1))
                .entry(IoEntry::read(9, 0))
                .build(),
        )
        .unwrap();
    let good = client
        .submit(
            on_frame(EventCounter::NextOccurrence)
                .entry(IoEntry::write(0, 8, 3))
                .entry(IoEntry::read(0, 8))
                .build(),
        )
        .unwrap();

    client.on_event(7, 0);
    let first = next_event(&mut rx).await;
    assert_eq!(first.transaction_id(), bad);
    assert_eq!(first.event_id, FAILED);
    assert_eq!(first.payload.error_code, -5);

    let second = next_event(&mut rx).await;
    assert_eq!(second.transaction_id(), good);
    assert_eq!(second.event_id, DONE);
    assert_eq!(second.payload.results[0].value(), 3);
    assert_eq!(client.cancel(good), Err(SubmitError::NotFound { id: good }));
    assert_eq!(client.pending(), 0);

    let inline = client
        .submit(
            on_frame(EventCounter::NextOccurrence)
                .entry(IoEntry::read(9, 0))
                .run_in_event_context()
                .build(),
        )
        .unwrap();
    client.on_event(7, 1);
    let ev = rx.try_recv().unwrap();
    assert_eq!((ev.transaction_id(), ev.event_id), (inline, FAILED));

    let later = client
        .submit(TransactionInfo::builder().entry(IoEntry::read(0, 8)).emit_success(DONE).build())
        .unwrap();
    assert_eq!(next_event(&mut rx).await.transaction_id(), later);
}

#[tokio::test]
async fn oversized_poll_timeout_keeps_siblings_running() {
    let (_regs, client) = scratch_client(ClientConfig::default());
    let mut rx = client.subscribe();
    client.register_io(&[IoEntry::write(0, 0x8, 0x1)]).unwrap();

    let polling = client
        .submit(
            TransactionInfo::builder()
                .entry(IoEntry::poll(0, 0x8, 0x1, 0x1, Duration::MAX))
                .emit_success(DONE)
                .emit_error(FAILED)
                .build(),
        )
        .unwrap();
    let sibling = client
        .submit(
            TransactionInfo::builder()
                .entry(IoEntry::read(0, 0x8))
                .emit_success(DONE)
                .emit_error(FAILED)
                .build(),
        )
        .unwrap();

    let first = next_event(&mut rx).await;
    assert_eq!((first.transaction_id(), first.event_id), (polling, DONE));
    let second = next_event(&mut rx).await;
    assert_eq!((second.transaction_id(), second.event_id), (sibling, DONE));
    assert_eq!(client.cancel(sibling), Err(SubmitError::NotFound { id: sibling }));
}

#[tokio::test]
async fn register_io_applies_bias() {
    let (regs, client) = scratch_client(ClientConfig::default());

    let results = client
        .register_io(&[
            IoEntry::SetBias { bias: 0x20 },
            IoEntry::write(0, 0x4, 0x55),
            IoEntry::read(0, 0x4),
            IoEntry::WriteBatch {
                bank: 1,
                offset: 0,
                bytes: vec![1, 2, 3],
            },
            IoEntry::ReadBatch {
                bank: 1,
                offset: 0,
                size: 3,
            },
        ])
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].offset, 0x24);
    assert_eq!(results[0].value(), 0x55);
    assert_eq!(results[1].offset, 0x20);
    assert_eq!(results[1].bytes, vec![1, 2, 3]);
    assert_eq!(regs.snapshot(1).unwrap()[0x20..0x23], [1, 2, 3]);

    let err = client.register_io(&[IoEntry::read(0, 0x1000)]).unwrap_err();
    assert_eq!(err.code(), -34);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_get_distinct_ids() {
    let cfg = ClientConfig {
        bus_capacity: 4096,
        ..ClientConfig::default()
    };
    let (_regs, client) = scratch_client(cfg);
    let mut rx = client.subscribe();

    let mut handles = Vec::new();
    for task in 0..10u64 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            (0..100u64)
                .map(|i| {
                    let info = TransactionInfo::builder()
                        .entry(IoEntry::write(0, (task * 100 + i) % 0x40 * 4, i))
                        .emit_success(DONE)
                        .emit_error(FAILED)
                        .build();
                    client.submit(info).unwrap()
                })
                .collect::<Vec<_>>()
        }));
    }

    let mut ids = HashSet::new();
    for h in handles {
        ids.extend(h.await.unwrap());
    }
    assert_eq!(ids.len(), 1000);

    let mut completed = HashSet::new();
    for _ in 0..1000 {
        let ev = next_event(&mut rx).await;
        assert_eq!(ev.event_id, DONE);
        completed.insert(ev.transaction_id());
    }
    assert_eq!(completed, ids);
}
