//! # Subscribe
//!
//! Extension point for code that reacts to finished transactions: log
//! shippers, DMA hand-off, test probes.
//!
//! Each implementation gets its own worker and bounded queue inside a
//! [`SubscriberSet`](crate::SubscriberSet). The dispatcher never waits on it;
//! when its queue is full, new events for it are discarded.
//!
//! [`Subscribe::accepts`] runs on the publishing side, before queueing, so a
//! subscriber interested only in error ids costs nothing for successes.

use async_trait::async_trait;

use crate::events::CompletionEvent;
use crate::transactions::EventId;

/// Consumer of completion events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event. Runs on the subscriber's worker task.
    async fn on_event(&self, event: &CompletionEvent);

    /// Filter on the emitted event id; everything is accepted by default.
    fn accepts(&self, _event_id: EventId) -> bool {
        true
    }

    /// Name used in log records.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue length before events are discarded.
    fn queue_capacity(&self) -> usize {
        256
    }
}
