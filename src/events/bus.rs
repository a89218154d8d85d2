//! # Completion bus.
//!
//! [`Bus`] carries [`CompletionEvent`]s from the places where transactions
//! finish to everyone listening on the client. It wraps
//! [`tokio::sync::broadcast`].
//!
//! ```text
//! dispatcher pass ─┐                    ┌──► Client::subscribe() receivers
//!                  ├──► Bus::publish ───┤
//! on_event inline ─┘                    └──► subscriber_listener ──► SubscriberSet
//! ```
//!
//! ## Rules
//! - `publish()` is synchronous and never waits, so it is safe from blocking
//!   threads (the dispatcher pass runs on one).
//! - All receivers share one ring buffer of `capacity` events; a receiver that
//!   falls further behind sees `RecvError::Lagged(n)`.
//! - Events published while nobody listens are gone.

use tokio::sync::broadcast;

use super::event::CompletionEvent;

/// Broadcast channel for completion events.
///
/// Cloning a bus yields another handle to the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<CompletionEvent>,
}

impl Bus {
    /// Creates a bus holding up to `capacity` undelivered events (min 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes `ev` and returns how many receivers it reached.
    pub fn publish(&self, ev: CompletionEvent) -> usize {
        let (event_id, txn) = (ev.event_id, ev.transaction_id());
        match self.tx.send(ev) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!(event_id, transaction = txn, "completion published without receivers");
                0
            }
        }
    }

    /// Returns a receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<CompletionEvent> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
