//! # Client session.
//!
//! [`Client`] is the control surface of one session against a device: it
//! accepts transactions, delivers device events to them and publishes their
//! completions on a [`Bus`].
//!
//! ## Architecture
//! ```text
//!   submit / replace ──► admit (validate + allocate, no lock)
//!                          └─► Table::enqueue   (lock) ──► wake dispatcher
//!   on_event ──────────► Table::fire            (lock) ──► wake dispatcher
//!                          └─► inline transactions run here, after unlock
//!   cancel ────────────► Table::cancel          (lock)
//!   register_io ───────► executor::execute      (calling thread, no queue)
//!
//!   dispatcher (tokio task) ──► spawn_blocking(run pass) ──► Bus::publish
//!   listener   (tokio task) ──► Bus ──► SubscriberSet::emit
//! ```
//!
//! ## Rules
//! - The table lock is never held across backend calls, event emission or awaits.
//! - One failing transaction never affects the others.
//! - After [`Client::shutdown`], `submit` and `replace` return [`SubmitError::Closed`].

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Notify, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::admission::admit;
use crate::core::builder::ClientBuilder;
use crate::core::config::ClientConfig;
use crate::core::runner::run_transaction;
use crate::core::table::Table;
use crate::error::{RegisterError, SubmitError};
use crate::events::{Bus, CompletionEvent};
use crate::io::RegisterIo;
use crate::io::executor::{self, ExecOptions};
use crate::transactions::{EventId, IoEntry, IoResult, TransactionId, TransactionInfo};

/// State shared between the client handle and its dispatcher.
pub(crate) struct Shared {
    pub table: Mutex<Table>,
    pub wake: Notify,
    pub bus: Bus,
    pub io: Arc<dyn RegisterIo>,
    pub exec: ExecOptions,
    pub cfg: ClientConfig,
}

impl Shared {
    pub fn new(cfg: ClientConfig, io: Arc<dyn RegisterIo>) -> Self {
        Self {
            table: Mutex::new(Table::new()),
            wake: Notify::new(),
            bus: Bus::new(cfg.bus_capacity_clamped()),
            io,
            exec: ExecOptions {
                access_width: cfg.access_width_clamped(),
                poll: cfg.poll,
            },
            cfg,
        }
    }
}

/// Background task owned by the client.
pub(crate) struct Worker {
    pub token: CancellationToken,
    pub join: JoinHandle<()>,
}

impl Worker {
    async fn stop(self, name: &'static str) {
        self.token.cancel();
        if let Err(err) = self.join.await {
            tracing::error!(worker = name, error = %err, "worker terminated abnormally");
        }
    }
}

/// One client session.
///
/// Created with [`Client::builder`]; must be built inside a tokio runtime.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use regxact::{Client, ClientConfig, IoEntry, ScratchRegisters, TransactionInfo};
///
/// #[tokio::main]
/// async fn main() {
///     let regs = Arc::new(ScratchRegisters::new(&[64]));
///     let client = Client::builder(ClientConfig::default(), regs).build();
///     let mut rx = client.subscribe();
///
///     let info = TransactionInfo::builder()
///         .entry(IoEntry::write(0, 0x4, 0xff))
///         .entry(IoEntry::read(0, 0x4))
///         .emit_success(100)
///         .build();
///     let id = client.submit(info).unwrap();
///
///     let ev = rx.recv().await.unwrap();
///     assert_eq!(ev.transaction_id(), id);
///     assert_eq!(ev.payload.results[0].value(), 0xff);
///
///     client.shutdown().await;
/// }
/// ```
pub struct Client {
    shared: Arc<Shared>,
    dispatcher: Mutex<Option<Worker>>,
    listener: Mutex<Option<Worker>>,
}

impl Client {
    /// Returns a builder for a client driving `io`.
    pub fn builder(cfg: ClientConfig, io: Arc<dyn RegisterIo>) -> ClientBuilder {
        ClientBuilder::new(cfg, io)
    }

    pub(crate) fn new_internal(
        shared: Arc<Shared>,
        dispatcher: Worker,
        listener: Option<Worker>,
    ) -> Self {
        Self {
            shared,
            dispatcher: Mutex::new(Some(dispatcher)),
            listener: Mutex::new(listener),
        }
    }

    /// Queues a transaction and returns its id.
    ///
    /// Immediate transactions are handed to the dispatcher; event-bound ones
    /// wait in the trigger index for [`Client::on_event`].
    pub fn submit(&self, info: TransactionInfo) -> Result<TransactionId, SubmitError> {
        let txn = admit(info, &self.shared.cfg)?;
        let trigger = txn.info.trigger_event_id();
        let (id, schedule) = self.shared.table.lock().enqueue(txn)?;
        if schedule {
            self.shared.wake.notify_one();
        }
        tracing::debug!(transaction = id, trigger, "transaction queued");
        Ok(id)
    }

    /// Cancels a queued transaction. No completion event is emitted for it.
    ///
    /// Returns [`SubmitError::NotFound`] if `id` is unknown, executing or done.
    pub fn cancel(&self, id: TransactionId) -> Result<(), SubmitError> {
        let txn = self.shared.table.lock().cancel(id)?;
        tracing::debug!(transaction = id, trigger = txn.info.trigger_event_id(), "transaction cancelled");
        Ok(())
    }

    /// Replaces a queued transaction with `info` and returns the new id.
    ///
    /// `info` is validated first; on any error the old transaction stays queued.
    pub fn replace(
        &self,
        id: TransactionId,
        info: TransactionInfo,
    ) -> Result<TransactionId, SubmitError> {
        let txn = admit(info, &self.shared.cfg)?;
        let (new_id, schedule) = self.shared.table.lock().replace(id, txn)?;
        if schedule {
            self.shared.wake.notify_one();
        }
        tracing::debug!(transaction = id, replacement = new_id, "transaction replaced");
        Ok(new_id)
    }

    /// Delivers an occurrence of `event_id` with its device counter.
    ///
    /// Transactions armed with `run_in_event_context` execute before this
    /// returns, in submission order; other fired transactions go to the
    /// dispatcher.
    pub fn on_event(&self, event_id: EventId, counter: i64) {
        let fired = self.shared.table.lock().fire(event_id, counter);
        if fired.schedule {
            self.shared.wake.notify_one();
        }
        for id in &fired.dropped {
            tracing::warn!(
                transaction = *id,
                event_id,
                counter,
                "trigger counter already passed, transaction dropped"
            );
        }
        if fired.readied > 0 || !fired.inline.is_empty() {
            tracing::debug!(
                event_id,
                counter,
                readied = fired.readied,
                inline = fired.inline.len(),
                "event fired"
            );
        }

        for txn in fired.inline {
            let id = txn.id();
            if let Some(pending) = run_transaction(self.shared.io.as_ref(), &self.shared.exec, txn) {
                self.shared.bus.publish(pending.into_event());
            }
            self.shared.table.lock().finish(id);
        }
    }

    /// Executes `entries` right away on the calling thread, bypassing the queues.
    ///
    /// Returns one result per read-producing entry, or the first failure.
    pub fn register_io(&self, entries: &[IoEntry]) -> Result<Vec<IoResult>, RegisterError> {
        let mut slots = executor::empty_slots(entries, self.shared.exec.access_width);
        let exec = executor::execute(self.shared.io.as_ref(), &self.shared.exec, entries, &mut slots);
        match exec.error {
            Some(err) => Err(err),
            None => Ok(slots),
        }
    }

    /// Last counter delivered for `event_id` through [`Client::on_event`].
    pub fn event_counter(&self, event_id: EventId) -> Option<i64> {
        self.shared.table.lock().event_counter(event_id)
    }

    /// Number of transactions waiting on an event or in the ready queue.
    pub fn pending(&self) -> usize {
        self.shared.table.lock().pending()
    }

    /// Whether [`Client::shutdown`] has been called.
    pub fn is_closed(&self) -> bool {
        self.shared.table.lock().is_closed()
    }

    /// Returns a receiver for completion events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<CompletionEvent> {
        self.shared.bus.subscribe()
    }

    /// Returns the completion bus.
    pub fn bus(&self) -> &Bus {
        &self.shared.bus
    }

    /// Name of the register backend.
    pub fn backend_name(&self) -> &'static str {
        self.shared.io.name()
    }

    /// Closes the client and returns how many queued transactions were cancelled.
    ///
    /// ### Flow
    /// 1. Mark closed and release everything in the index and ready queue
    /// 2. Stop the dispatcher, waiting for an in-flight pass to finish
    /// 3. Forward remaining events to subscribers and stop their workers
    ///
    /// Calling it again returns `0`.
    pub async fn shutdown(&self) -> usize {
        let released = self.shared.table.lock().drain_all();

        let dispatcher = self.dispatcher.lock().take();
        if let Some(worker) = dispatcher {
            worker.stop("dispatcher").await;
        }
        let listener = self.listener.lock().take();
        if let Some(worker) = listener {
            worker.stop("subscriber_listener").await;
        }

        tracing::debug!(cancelled = released, "client shut down");
        released
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        for worker in [self.dispatcher.get_mut().take(), self.listener.get_mut().take()]
            .into_iter()
            .flatten()
        {
            worker.token.cancel();
        }
    }
}
