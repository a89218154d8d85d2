//! # Per-client transaction table.
//!
//! Holds every queued transaction of one client and the bookkeeping that
//! decides who owns it. The table lives behind the client's single mutex;
//! every method here is short and never touches a backend.
//!
//! ## Ownership
//! ```text
//! submit ──► enqueue ──┬─► ready queue ───────────────► detach_ready ──► Executing
//!                      │                                                   │
//!                      └─► index[event_id] ──► fire ──┬─► ready queue      ▼
//!                                                     ├─► inline ──────► finish
//!                                                     └─► dropped (late)
//! cancel / replace / drain_all remove from index or ready queue only
//! ```
//!
//! ## Rules
//! - Each record sits in exactly one of {index entry, ready queue, executor};
//!   `locations` tracks which one.
//! - Index entries keep submission order and are never removed once created.
//! - `dispatch_pending` is set when the dispatcher is asked to run and cleared
//!   when it detaches the ready queue, so scheduling is idempotent.

use std::collections::{HashMap, VecDeque};

use crate::error::SubmitError;
use crate::transactions::{
    EventCounter, EventId, TransactionId, TransactionInfo, TransactionResponse, Trigger,
};

/// A transaction record: the immutable request and its response buffer.
#[derive(Debug)]
pub(crate) struct Transaction {
    pub info: TransactionInfo,
    pub response: TransactionResponse,
}

impl Transaction {
    #[inline]
    pub fn id(&self) -> TransactionId {
        self.response.id
    }
}

/// Where a live transaction currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Location {
    Waiting(EventId),
    Ready,
    Executing,
}

/// Outcome of delivering one event occurrence.
#[derive(Debug, Default)]
pub(crate) struct Fired {
    /// Fired transactions that run inside the event call, in submission order.
    pub inline: Vec<Transaction>,
    /// Waiting transactions released because their counter is in the past.
    pub dropped: Vec<TransactionId>,
    /// Number of transactions moved to the ready queue.
    pub readied: usize,
    /// Whether the dispatcher must be woken.
    pub schedule: bool,
}

/// Queues, trigger index and id counter of one client.
#[derive(Debug, Default)]
pub(crate) struct Table {
    next_id: TransactionId,
    ready: VecDeque<Transaction>,
    index: HashMap<EventId, VecDeque<Transaction>>,
    locations: HashMap<TransactionId, Location>,
    counters: HashMap<EventId, i64>,
    dispatch_pending: bool,
    closed: bool,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next id and queues the record by its trigger.
    ///
    /// Returns the id and whether the dispatcher must be woken.
    pub fn enqueue(&mut self, mut txn: Transaction) -> Result<(TransactionId, bool), SubmitError> {
        if self.closed {
            return Err(SubmitError::Closed);
        }
        let id = self.next_id;
        self.next_id += 1;
        txn.response.id = id;

        let schedule = match txn.info.trigger() {
            Trigger::Immediate => self.push_ready(txn),
            Trigger::Event { event_id, .. } => {
                self.locations.insert(id, Location::Waiting(event_id));
                self.index.entry(event_id).or_default().push_back(txn);
                false
            }
        };
        Ok((id, schedule))
    }

    /// Delivers one occurrence of `event_id` carrying `counter`.
    pub fn fire(&mut self, event_id: EventId, counter: i64) -> Fired {
        self.counters.insert(event_id, counter);

        let mut fired = Fired::default();
        let Some(waiting) = self.index.get_mut(&event_id) else {
            return fired;
        };
        if waiting.is_empty() {
            return fired;
        }

        let mut ready = Vec::new();
        let mut kept = VecDeque::with_capacity(waiting.len());
        for txn in waiting.drain(..) {
            let expected = match txn.info.trigger() {
                Trigger::Event { counter, .. } => counter,
                Trigger::Immediate => EventCounter::NextOccurrence,
            };
            match expected {
                EventCounter::NextOccurrence => ready.push(txn),
                EventCounter::Exactly(c) if c == counter => ready.push(txn),
                EventCounter::Exactly(c) if c < counter => fired.dropped.push(txn.id()),
                EventCounter::Exactly(_) => kept.push_back(txn),
            }
        }
        *waiting = kept;

        for id in &fired.dropped {
            self.locations.remove(id);
        }
        for txn in ready {
            if txn.info.run_in_event_context() {
                self.locations.insert(txn.id(), Location::Executing);
                fired.inline.push(txn);
            } else {
                fired.readied += 1;
                fired.schedule |= self.push_ready(txn);
            }
        }
        fired
    }

    /// Takes the whole ready queue for one dispatcher pass.
    pub fn detach_ready(&mut self) -> Vec<Transaction> {
        self.dispatch_pending = false;
        let batch: Vec<Transaction> = self.ready.drain(..).collect();
        for txn in &batch {
            self.locations.insert(txn.id(), Location::Executing);
        }
        batch
    }

    /// Forgets a transaction that finished executing.
    pub fn finish(&mut self, id: TransactionId) {
        if self.locations.get(&id) == Some(&Location::Executing) {
            self.locations.remove(&id);
        }
    }

    /// Removes a queued transaction without running it.
    pub fn cancel(&mut self, id: TransactionId) -> Result<Transaction, SubmitError> {
        let queue = match self.locations.get(&id) {
            Some(Location::Waiting(event_id)) => self.index.get_mut(event_id),
            Some(Location::Ready) => Some(&mut self.ready),
            Some(Location::Executing) | None => None,
        };
        let txn = queue
            .and_then(|q| {
                let pos = q.iter().position(|t| t.id() == id)?;
                q.remove(pos)
            })
            .ok_or(SubmitError::NotFound { id })?;
        self.locations.remove(&id);
        Ok(txn)
    }

    /// Cancels `id` and queues `txn` in one step.
    ///
    /// The old transaction is left untouched if the table is closed.
    pub fn replace(
        &mut self,
        id: TransactionId,
        txn: Transaction,
    ) -> Result<(TransactionId, bool), SubmitError> {
        if self.closed {
            return Err(SubmitError::Closed);
        }
        self.cancel(id)?;
        self.enqueue(txn)
    }

    /// Closes the table and releases every queued transaction.
    ///
    /// Executing transactions are left to finish. Returns the released count.
    pub fn drain_all(&mut self) -> usize {
        self.closed = true;
        self.dispatch_pending = false;

        let mut released = 0;
        for txn in self.ready.drain(..) {
            self.locations.remove(&txn.id());
            released += 1;
        }
        for waiting in self.index.values_mut() {
            for txn in waiting.drain(..) {
                self.locations.remove(&txn.id());
                released += 1;
            }
        }
        released
    }

    /// Last counter delivered for `event_id`.
    pub fn event_counter(&self, event_id: EventId) -> Option<i64> {
        self.counters.get(&event_id).copied()
    }

    /// Number of transactions waiting on an event or in the ready queue.
    pub fn pending(&self) -> usize {
        self.locations
            .values()
            .filter(|loc| !matches!(loc, Location::Executing))
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn push_ready(&mut self, txn: Transaction) -> bool {
        self.locations.insert(txn.id(), Location::Ready);
        self.ready.push_back(txn);
        let schedule = !self.dispatch_pending;
        self.dispatch_pending = true;
        schedule
    }
}
