//! # Fluent construction of [`TransactionInfo`].
//!
//! ```rust
//! use regxact::{EventCounter, IoEntry, TransactionInfo};
//!
//! let info = TransactionInfo::builder()
//!     .on_event(1, 7, EventCounter::NextOccurrence)
//!     .entry(IoEntry::read(0, 0x10))
//!     .emit_success(100)
//!     .build();
//! assert_eq!(info.entries().len(), 1);
//! assert_eq!(info.success_event_id(), Some(100));
//! ```
//!
//! Nothing is validated here; admission checks the request on submit.

use super::{DeviceId, EventCounter, EventId, IoEntry, TransactionInfo, Trigger};

/// Builder for [`TransactionInfo`].
#[derive(Clone, Debug)]
pub struct TransactionInfoBuilder {
    trigger: Trigger,
    entries: Vec<IoEntry>,
    run_in_event_context: bool,
    success: Option<EventId>,
    error: Option<EventId>,
}

impl TransactionInfoBuilder {
    /// Creates a builder for an immediate transaction with no entries.
    pub fn new() -> Self {
        Self {
            trigger: Trigger::Immediate,
            entries: Vec::new(),
            run_in_event_context: false,
            success: None,
            error: None,
        }
    }

    /// Arms the transaction on `event_id` from `device_id`.
    pub fn on_event(mut self, device_id: DeviceId, event_id: EventId, counter: EventCounter) -> Self {
        self.trigger = Trigger::Event {
            device_id,
            event_id,
            counter,
        };
        self
    }

    /// Appends one entry; entries run in the order they are added.
    pub fn entry(mut self, entry: IoEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Appends every entry of `entries`, in iteration order.
    pub fn entries(mut self, entries: impl IntoIterator<Item = IoEntry>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Runs the transaction inside [`Client::on_event`](crate::Client::on_event)
    /// instead of handing it to the dispatcher. Ignored for immediate transactions.
    pub fn run_in_event_context(mut self) -> Self {
        self.run_in_event_context = true;
        self
    }

    /// Event id published when every entry succeeds.
    pub fn emit_success(mut self, id: EventId) -> Self {
        self.success = Some(id);
        self
    }

    /// Event id published when an entry fails.
    pub fn emit_error(mut self, id: EventId) -> Self {
        self.error = Some(id);
        self
    }

    /// Builds the request.
    pub fn build(self) -> TransactionInfo {
        let mut info = TransactionInfo::new(self.trigger, self.entries)
            .with_run_in_event_context(self.run_in_event_context);
        if let Some(id) = self.success {
            info = info.with_success_event(id);
        }
        if let Some(id) = self.error {
            info = info.with_error_event(id);
        }
        info
    }
}

impl Default for TransactionInfoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionInfo {
    /// Starts a [`TransactionInfoBuilder`].
    pub fn builder() -> TransactionInfoBuilder {
        TransactionInfoBuilder::new()
    }
}
