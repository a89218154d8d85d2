//! # Completion fan-out.
//!
//! [`SubscriberSet`] hands every completion event to each interested
//! [`Subscribe`] implementation without ever waiting on one of them.
//!
//! ```text
//! emit(event)
//!   for each subscriber:
//!     accepts(event_id)? ── no ──► skip
//!        │ yes
//!        ▼
//!     try_send ──► [bounded queue] ──► worker ──► on_event()
//!        │ full/closed                    └─► panic caught, logged at error
//!        ▼
//!     dropped += 1, logged at warn
//! ```
//!
//! ## Rules
//! - Each subscriber sees its accepted events in publish order.
//! - Nothing is ordered across subscribers.
//! - A slow or panicking subscriber only loses its own events.
//!
//! The worker wraps `on_event` in `AssertUnwindSafe`; a subscriber that panics
//! while holding its own lock may leave that state poisoned or half-updated.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::CompletionEvent;
use crate::subscribers::Subscribe;

/// Delivery counters of one subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Events queued for the subscriber.
    pub queued: u64,
    /// Events lost to a full or closed queue.
    pub dropped: u64,
    /// `on_event` calls that panicked.
    pub panicked: u64,
}

#[derive(Default)]
struct Counters {
    queued: AtomicU64,
    dropped: AtomicU64,
    panicked: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DeliveryStats {
        DeliveryStats {
            queued: self.queued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            panicked: self.panicked.load(Ordering::Relaxed),
        }
    }
}

struct Slot {
    sub: Arc<dyn Subscribe>,
    tx: mpsc::Sender<Arc<CompletionEvent>>,
    counters: Arc<Counters>,
}

/// Per-subscriber queues and workers.
pub struct SubscriberSet {
    slots: Vec<Slot>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates the set and starts one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime. Queue sizes come from
    /// [`Subscribe::queue_capacity`] (at least 1).
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut slots = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
            let counters = Arc::new(Counters::default());
            workers.push(tokio::spawn(worker(Arc::clone(&sub), rx, Arc::clone(&counters))));
            slots.push(Slot { sub, tx, counters });
        }
        Self { slots, workers }
    }

    /// Number of subscribers in the set.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the set has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Queues `event` for every subscriber that accepts its id. Never waits.
    pub fn emit(&self, event: &CompletionEvent) {
        let mut shared: Option<Arc<CompletionEvent>> = None;

        for slot in &self.slots {
            if !slot.sub.accepts(event.event_id) {
                continue;
            }
            let ev = shared.get_or_insert_with(|| Arc::new(event.clone()));
            match slot.tx.try_send(Arc::clone(ev)) {
                Ok(()) => {
                    slot.counters.queued.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    slot.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    let reason = match err {
                        mpsc::error::TrySendError::Full(_) => "queue full",
                        mpsc::error::TrySendError::Closed(_) => "worker gone",
                    };
                    tracing::warn!(
                        subscriber = slot.sub.name(),
                        event_id = event.event_id,
                        transaction = event.transaction_id(),
                        reason,
                        "completion dropped for subscriber"
                    );
                }
            }
        }
    }

    /// Delivery counters per subscriber, in registration order.
    pub fn stats(&self) -> Vec<(&'static str, DeliveryStats)> {
        self.slots
            .iter()
            .map(|s| (s.sub.name(), s.counters.snapshot()))
            .collect()
    }

    /// Closes every queue and waits until the workers have drained them.
    pub async fn shutdown(self) {
        drop(self.slots);
        for h in self.workers {
            let _ = h.await;
        }
    }
}

async fn worker(
    sub: Arc<dyn Subscribe>,
    mut rx: mpsc::Receiver<Arc<CompletionEvent>>,
    counters: Arc<Counters>,
) {
    while let Some(ev) = rx.recv().await {
        let call = std::panic::AssertUnwindSafe(sub.on_event(&ev)).catch_unwind();
        if let Err(panic) = call.await {
            counters.panicked.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                subscriber = sub.name(),
                transaction = ev.transaction_id(),
                reason = panic_message(panic.as_ref()),
                "subscriber panicked"
            );
        }
    }
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
