//! # Example: triggered_read
//!
//! Arms register transactions on a frame counter and drives the counter by hand.
//!
//! Shows how to:
//! - Build a [`Client`] over the in-memory [`ScratchRegisters`] backend.
//! - Queue event-bound transactions with exact and next-occurrence counters.
//! - Attach the built-in [`LogWriter`] and a custom [`Subscribe`] implementation.
//! - Observe a poll timeout reported through the error event.
//!
//! ## Flow
//! ```text
//! submit(frame 2: write + read)   submit(next frame: modify)   submit(poll, inline)
//!        │                               │                            │
//!        └────────────── index[FRAME_START] ──────────────────────────┘
//! on_event(FRAME_START, 1) ──► modify, poll (inline, times out)
//! on_event(FRAME_START, 2) ──► write + read
//!        └─► Bus ──► LogWriter / Printer
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example triggered_read --features logging
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use regxact::{
    Client, ClientConfig, CompletionEvent, EventCounter, IoEntry, LogWriter, ScratchRegisters,
    Subscribe, TransactionInfo,
};
use tracing_subscriber::EnvFilter;

const SENSOR: i32 = 1;
const FRAME_START: i64 = 7;
const DONE: i64 = 100;
const FAILED: i64 = 101;

/// Prints the read-back values of successful transactions.
struct Printer;

#[async_trait]
impl Subscribe for Printer {
    async fn on_event(&self, ev: &CompletionEvent) {
        for r in &ev.payload.results {
            println!(
                "[printer] txn={} bank={} offset={:#x} value={:#x}",
                ev.transaction_id(),
                r.bank,
                r.offset,
                r.value()
            );
        }
    }

    fn accepts(&self, event_id: i64) -> bool {
        event_id == DONE
    }

    fn name(&self) -> &'static str {
        "printer"
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let regs = Arc::new(ScratchRegisters::new(&[0x100]));
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new()), Arc::new(Printer)];
    let client = Client::builder(ClientConfig::default(), regs.clone())
        .with_subscribers(subs)
        .build();

    let readout = TransactionInfo::builder()
        .on_event(SENSOR, FRAME_START, EventCounter::Exactly(2))
        .entry(IoEntry::write(0, 0x20, 0xdead_beef))
        .entry(IoEntry::read(0, 0x20))
        .emit_success(DONE)
        .emit_error(FAILED)
        .build();
    client.submit(readout)?;

    let enable = TransactionInfo::builder()
        .on_event(SENSOR, FRAME_START, EventCounter::NextOccurrence)
        .entry(IoEntry::modify(0, 0x04, 0x1, 0x1))
        .entry(IoEntry::read(0, 0x04))
        .emit_success(DONE)
        .emit_error(FAILED)
        .build();
    client.submit(enable)?;

    let wait_ready = TransactionInfo::builder()
        .on_event(SENSOR, FRAME_START, EventCounter::NextOccurrence)
        .entry(IoEntry::poll(0, 0x08, 0x80, 0x80, Duration::from_millis(5)))
        .run_in_event_context()
        .emit_success(DONE)
        .emit_error(FAILED)
        .build();
    client.submit(wait_ready)?;

    println!("[main] pending={}", client.pending());
    client.on_event(FRAME_START, 1);
    client.on_event(FRAME_START, 2);

    let direct = client.register_io(&[IoEntry::read(0, 0x04)])?;
    println!("[main] direct read 0x04 = {:#x}", direct[0].value());

    tokio::time::sleep(Duration::from_millis(50)).await;
    let cancelled = client.shutdown().await;
    println!("[main] shut down, cancelled={cancelled}");
    Ok(())
}
