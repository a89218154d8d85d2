//! # Submission admission.
//!
//! Checks a [`TransactionInfo`] and allocates its response before anything
//! touches the client lock. A request that fails here leaves no trace: no id
//! is consumed and nothing is queued.
//!
//! ## Checks
//! - the entry list is non-empty and within `ClientConfig::max_entries`
//! - batch entries move at least one byte
//! - event-bound triggers name a real event (not `EVENT_ID_NONE`)
//! - the encoded response fits `ClientConfig::max_response_bytes`

use crate::core::config::ClientConfig;
use crate::core::table::Transaction;
use crate::error::SubmitError;
use crate::transactions::{EVENT_ID_NONE, IoEntry, TransactionInfo, TransactionResponse, Trigger};

/// Placeholder id until the table assigns the real one.
const UNASSIGNED: i64 = -1;

/// Validates `info` and builds its transaction record.
pub(crate) fn admit(info: TransactionInfo, cfg: &ClientConfig) -> Result<Transaction, SubmitError> {
    validate(&info, cfg)?;
    let response = TransactionResponse::allocate(
        UNASSIGNED,
        info.entries(),
        cfg.access_width_clamped(),
        cfg.response_limit(),
    )?;
    Ok(Transaction { info, response })
}

fn validate(info: &TransactionInfo, cfg: &ClientConfig) -> Result<(), SubmitError> {
    let entries = info.entries();
    if entries.is_empty() {
        return Err(SubmitError::invalid("transaction has no entries"));
    }
    if let Some(limit) = cfg.entry_limit() {
        if entries.len() > limit {
            return Err(SubmitError::invalid(format!(
                "{} entries exceed the limit of {limit}",
                entries.len()
            )));
        }
    }
    if let Trigger::Event { event_id, .. } = info.trigger() {
        if event_id == EVENT_ID_NONE {
            return Err(SubmitError::invalid("event trigger without an event id"));
        }
    }
    for (idx, entry) in entries.iter().enumerate() {
        let empty_batch = match entry {
            IoEntry::ReadBatch { size, .. } => *size == 0,
            IoEntry::WriteBatch { bytes, .. } => bytes.is_empty(),
            _ => false,
        };
        if empty_batch {
            return Err(SubmitError::invalid(format!(
                "entry {idx} ({}) moves no bytes",
                entry.as_label()
            )));
        }
    }
    Ok(())
}
