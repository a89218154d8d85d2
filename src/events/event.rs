//! # Completion events emitted by a client.
//!
//! A [`CompletionEvent`] announces that a transaction finished. It carries
//! the event id chosen by the submitter (success or error id), the
//! [`TransactionResponse`] payload and a wall-clock timestamp.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use regxact::{CompletionEvent, TransactionResponse};
//!
//! let payload = TransactionResponse::decode(&[0u8; 32]).unwrap();
//! let ev = CompletionEvent::new(100, Arc::new(payload));
//!
//! assert_eq!(ev.event_id, 100);
//! assert!(ev.is_success());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::transactions::{EventId, TransactionId, TransactionResponse};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Completion of one transaction.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp of emission
/// - `payload`: shared response record (cheap to clone across subscribers)
#[derive(Clone, Debug)]
pub struct CompletionEvent {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Success or error event id of the transaction.
    pub event_id: EventId,
    /// Response record.
    pub payload: Arc<TransactionResponse>,
}

impl CompletionEvent {
    /// Creates an event with current timestamp and next sequence number.
    pub fn new(event_id: EventId, payload: Arc<TransactionResponse>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            event_id,
            payload,
        }
    }

    /// Id of the transaction that completed.
    #[inline]
    pub fn transaction_id(&self) -> TransactionId {
        self.payload.id
    }

    /// Whether the transaction succeeded.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.payload.is_success()
    }

    /// Timestamp as nanoseconds since the Unix epoch (`0` if the clock is earlier).
    pub fn timestamp_ns(&self) -> i64 {
        self.at
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

/// Completion not yet handed to the bus.
///
/// Sequence number and timestamp are assigned by [`PendingEvent::into_event`],
/// right before publishing.
#[derive(Debug)]
pub(crate) struct PendingEvent {
    pub event_id: EventId,
    pub payload: TransactionResponse,
}

impl PendingEvent {
    pub fn into_event(self) -> CompletionEvent {
        CompletionEvent::new(self.event_id, Arc::new(self.payload))
    }
}
