//! # regxact
//!
//! **regxact** is an event-triggered register transaction engine.
//!
//! A client submits transactions: ordered lists of register reads, writes,
//! read-modify-writes and polls. Each one runs either immediately or when a
//! device event fires with a matching counter. Every finished transaction
//! produces one completion event carrying its results.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   TransactionInfo          TransactionInfo          on_event(id, counter)
//!   (Immediate)              (Event trigger)                 │
//!        │                        │                          │
//!        ▼                        ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Client (one session, one lock)                                   │
//! │  - admission (validate + allocate response)                       │
//! │  - trigger index   event id ─► [txn, txn, ...]  (submission order)│
//! │  - ready queue     FIFO                                           │
//! │  - locations       Waiting(event) | Ready | Executing             │
//! └──────┬──────────────────────────────────────────────┬─────────────┘
//!        │ wake (idempotent)                            │ run_in_event_context
//!        ▼                                              ▼
//! ┌─────────────────────────────┐              ┌─────────────────────┐
//! │ Dispatcher (tokio task)     │              │ inline, in on_event │
//! │  detach ready queue         │              └──────────┬──────────┘
//! │  spawn_blocking(run pass)   │                         │
//! └──────┬──────────────────────┘                         │
//!        ▼                                                ▼
//!   IoEntry executor ──► RegisterIo backend (read / write / batch)
//!        │
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │              Bus (broadcast of CompletionEvent)                   │
//! └──────┬──────────────────────────────────────┬─────────────────────┘
//!        ▼                                      ▼
//!  Client::subscribe()                 subscriber_listener ──► SubscriberSet
//! ```
//!
//! ### Lifecycle of one transaction
//! ```text
//! submit ──► Waiting(event) ──► fire ──┬─► Ready ──► Executing ──► completion event
//!   │                                  ├─► inline Executing ─────► completion event
//!   │                                  └─► dropped (counter already passed)
//!   └──────► Ready (Immediate)
//! cancel / replace / shutdown: Waiting or Ready only, no completion event
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                        |
//! |-------------------|----------------------------------------------------------|-------------------------------------------|
//! | **Client**        | Submit, cancel, replace, deliver events, direct I/O.     | [`Client`], [`ClientBuilder`]             |
//! | **Requests**      | Triggers, entry lists, completion event ids.             | [`TransactionInfo`], [`IoEntry`]          |
//! | **Responses**     | Per-read results and the wire encoding.                  | [`TransactionResponse`], [`IoResult`]     |
//! | **Backends**      | Register access seam and an in-memory implementation.    | [`RegisterIo`], [`ScratchRegisters`]      |
//! | **Subscriber API**| Consume completion events (logging, custom handlers).    | [`Subscribe`], [`SubscriberSet`]          |
//! | **Errors**        | Submission, register and decoding errors.                | [`SubmitError`], [`RegisterError`]        |
//! | **Configuration** | Bus capacity, access width, limits, poll policy.         | [`ClientConfig`], [`PollPolicy`]          |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use regxact::{Client, ClientConfig, EventCounter, IoEntry, ScratchRegisters, TransactionInfo};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let regs = Arc::new(ScratchRegisters::new(&[0x100]));
//!     let client = Client::builder(ClientConfig::default(), regs.clone()).build();
//!     let mut rx = client.subscribe();
//!
//!     // Read a status register on the third frame-start interrupt.
//!     let info = TransactionInfo::builder()
//!         .on_event(1, 7, EventCounter::Exactly(3))
//!         .entry(IoEntry::write(0, 0x10, 0xab))
//!         .entry(IoEntry::read(0, 0x10))
//!         .emit_success(100)
//!         .emit_error(101)
//!         .build();
//!     let id = client.submit(info)?;
//!
//!     client.on_event(7, 2);
//!     client.on_event(7, 3);
//!
//!     let ev = rx.recv().await?;
//!     assert_eq!(ev.transaction_id(), id);
//!     assert_eq!(ev.event_id, 100);
//!     assert_eq!(ev.payload.results[0].value(), 0xab);
//!
//!     client.shutdown().await;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod io;
mod policies;
mod subscribers;
mod transactions;

// ---- Public re-exports ----

pub use crate::core::{Client, ClientBuilder, ClientConfig};
pub use error::{DecodeError, RegisterError, SubmitError};
pub use events::{Bus, CompletionEvent};
pub use io::{RegisterIo, ScratchRegisters};
pub use policies::PollPolicy;
pub use subscribers::{DeliveryStats, Subscribe, SubscriberSet};
pub use transactions::{
    BankId, DeviceId, EVENT_ID_NONE, EventCounter, EventId, IoEntry, IoResult,
    RESPONSE_HEADER_SIZE, RESULT_HEADER_SIZE, TransactionId, TransactionInfo,
    TransactionInfoBuilder, TransactionResponse, Trigger,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
