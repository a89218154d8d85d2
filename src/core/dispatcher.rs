//! # Dispatcher worker.
//!
//! One tokio task per client drains the ready queue. Each activation takes
//! the whole queue in one critical section and runs it on a blocking thread,
//! since backends and poll entries block.
//!
//! ```text
//! loop:
//!   select(biased):
//!     token.cancelled()  → exit
//!     wake.notified()    → detach_ready()  (clears dispatch_pending)
//!                          spawn_blocking:
//!                            for txn in batch (FIFO):
//!                              run_transaction → publish completion → finish(id)
//! ```
//!
//! ## Rules
//! - Submissions that arrive during a pass store a `Notify` permit and start
//!   the next pass; the worker never loops on the queue by itself.
//! - Cancellation is observed between passes only. A running pass completes.
//! - A panicking backend fails only the transaction it was running; every
//!   transaction of the pass is still finished.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::client::Shared;
use crate::core::runner::run_transaction;
use crate::core::table::Transaction;

/// Spawns the dispatcher worker for `shared`.
pub(crate) fn spawn(shared: Arc<Shared>, token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(run(shared, token))
}

async fn run(shared: Arc<Shared>, token: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = shared.wake.notified() => {}
        }

        let batch = shared.table.lock().detach_ready();
        if batch.is_empty() {
            continue;
        }
        tracing::debug!(transactions = batch.len(), "dispatch pass");

        let pass = Arc::clone(&shared);
        if let Err(err) = tokio::task::spawn_blocking(move || run_pass(&pass, batch)).await {
            tracing::error!(error = %err, "dispatch pass aborted");
        }
    }
    tracing::debug!("dispatcher stopped");
}

fn run_pass(shared: &Shared, batch: Vec<Transaction>) {
    for txn in batch {
        let id = txn.id();
        let completion = run_transaction(shared.io.as_ref(), &shared.exec, txn);
        if let Some(pending) = completion {
            shared.bus.publish(pending.into_event());
        }
        shared.table.lock().finish(id);
    }
}
