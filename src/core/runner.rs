//! # Run a single transaction.
//!
//! Executes the entry list of one [`Transaction`] and turns the outcome into
//! the completion to emit.
//!
//! ```text
//! Success:
//!   execute() → no error → error_code = 0, completion_index = n - 1
//!             → PendingEvent(success_event_id)
//! Failure:
//!   execute() → RegisterError → error_code = err.code(), completion_index = last ok
//!             → PendingEvent(error_event_id)
//! Panic (backend bug):
//!   execute() unwinds → caught → error_code = -EIO, completion_index as last set
//!             → PendingEvent(error_event_id)
//! ```
//!
//! ## Rules
//! - Called without the client lock held; may block (backend, poll sleeps).
//! - Exactly one completion per transaction, unless its event id is unset.
//! - A panic is contained to the transaction that raised it.

use std::panic::{self, AssertUnwindSafe};

use crate::core::table::Transaction;
use crate::error::ERRNO_IO;
use crate::events::PendingEvent;
use crate::io::RegisterIo;
use crate::io::executor::{self, ExecOptions};
use crate::subscribers::panic_message;
use crate::transactions::{EventId, TransactionInfo, TransactionResponse};

/// Executes `txn` and returns its completion, if one is configured.
pub(crate) fn run_transaction(
    io: &dyn RegisterIo,
    opts: &ExecOptions,
    txn: Transaction,
) -> Option<PendingEvent> {
    let Transaction { info, mut response } = txn;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        execute_into(io, opts, &info, &mut response)
    }));
    let event_id = match outcome {
        Ok(event_id) => event_id,
        Err(panic) => {
            response.error_code = ERRNO_IO;
            tracing::error!(
                transaction = response.id,
                reason = panic_message(panic.as_ref()),
                "register backend panicked, transaction failed"
            );
            info.error_event_id()
        }
    };

    event_id.map(|event_id| PendingEvent {
        event_id,
        payload: response,
    })
}

fn execute_into(
    io: &dyn RegisterIo,
    opts: &ExecOptions,
    info: &TransactionInfo,
    response: &mut TransactionResponse,
) -> Option<EventId> {
    let exec = executor::execute(io, opts, info.entries(), &mut response.results);
    response.completion_index = exec.completion_index();

    match &exec.error {
        None => {
            response.error_code = 0;
            tracing::debug!(
                transaction = response.id,
                entries = info.entries().len(),
                results = response.num_entries,
                "transaction completed"
            );
            info.success_event_id()
        }
        Some(err) => {
            response.error_code = err.code();
            tracing::debug!(
                transaction = response.id,
                error = err.as_label(),
                code = err.code(),
                completion_index = response.completion_index,
                "transaction failed"
            );
            info.error_event_id()
        }
    }
}
