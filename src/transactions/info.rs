//! # Transaction request.
//!
//! Defines [`TransactionInfo`], the caller-supplied description of a
//! transaction: when it runs ([`Trigger`]), what it does (ordered
//! [`IoEntry`] list) and which event ids announce its outcome.
//!
//! A request can be created:
//! - **Explicitly** with [`TransactionInfo::new`]
//! - **Fluently** with [`TransactionInfo::builder`]
//!
//! ## Rules
//! - The request is immutable once submitted.
//! - The id is assigned by the client at submit time, not by the caller.

use super::{DeviceId, EVENT_ID_NONE, EventId, IoEntry};

/// Which occurrence of the trigger event arms the transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventCounter {
    /// The very next occurrence, whatever its counter.
    NextOccurrence,
    /// The occurrence carrying exactly this counter.
    Exactly(i64),
}

impl EventCounter {
    /// Raw value of the "next occurrence" sentinel.
    pub const ON_NEXT_OCCURRENCE: i64 = -1;

    /// Converts a raw counter, mapping the sentinel to [`EventCounter::NextOccurrence`].
    pub fn from_raw(raw: i64) -> Self {
        if raw == Self::ON_NEXT_OCCURRENCE {
            EventCounter::NextOccurrence
        } else {
            EventCounter::Exactly(raw)
        }
    }
}

/// When a transaction becomes ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// Ready as soon as it is submitted.
    Immediate,
    /// Ready when `event_id` fires with a matching counter.
    Event {
        device_id: DeviceId,
        event_id: EventId,
        counter: EventCounter,
    },
}

/// Caller-supplied transaction request.
///
/// ## Example
/// ```rust
/// use regxact::{EventCounter, IoEntry, TransactionInfo, Trigger};
///
/// let info = TransactionInfo::new(
///     Trigger::Event { device_id: 1, event_id: 7, counter: EventCounter::Exactly(3) },
///     vec![IoEntry::write(0, 0x4, 0xff), IoEntry::read(0, 0x4)],
/// )
/// .with_success_event(100)
/// .with_error_event(101);
///
/// assert_eq!(info.trigger_event_id(), 7);
/// assert_eq!(info.read_entries(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionInfo {
    trigger: Trigger,
    entries: Vec<IoEntry>,
    run_in_event_context: bool,
    emit_success_event_id: Option<EventId>,
    emit_error_event_id: Option<EventId>,
}

impl TransactionInfo {
    /// Creates a request with no completion events and deferred execution.
    pub fn new(trigger: Trigger, entries: Vec<IoEntry>) -> Self {
        Self {
            trigger,
            entries,
            run_in_event_context: false,
            emit_success_event_id: None,
            emit_error_event_id: None,
        }
    }

    /// Returns the trigger.
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Returns the trigger event id, or [`EVENT_ID_NONE`] for immediate requests.
    pub fn trigger_event_id(&self) -> EventId {
        match self.trigger {
            Trigger::Immediate => EVENT_ID_NONE,
            Trigger::Event { event_id, .. } => event_id,
        }
    }

    /// Returns the ordered entry list.
    pub fn entries(&self) -> &[IoEntry] {
        &self.entries
    }

    /// Number of read-producing entries (response slots).
    pub fn read_entries(&self) -> usize {
        self.entries.iter().filter(|e| e.is_read()).count()
    }

    /// Whether a fired transaction runs inline with event delivery.
    pub fn run_in_event_context(&self) -> bool {
        self.run_in_event_context
    }

    /// Event id emitted on success, if any.
    pub fn success_event_id(&self) -> Option<EventId> {
        self.emit_success_event_id
    }

    /// Event id emitted on failure, if any.
    pub fn error_event_id(&self) -> Option<EventId> {
        self.emit_error_event_id
    }

    /// Returns a new request with the given success event id.
    pub fn with_success_event(mut self, id: EventId) -> Self {
        self.emit_success_event_id = Some(id);
        self
    }

    /// Returns a new request with the given error event id.
    pub fn with_error_event(mut self, id: EventId) -> Self {
        self.emit_error_event_id = Some(id);
        self
    }

    /// Returns a new request with the inline execution flag set to `inline`.
    pub fn with_run_in_event_context(mut self, inline: bool) -> Self {
        self.run_in_event_context = inline;
        self
    }
}
