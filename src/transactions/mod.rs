//! # Transaction data model.
//!
//! This module provides the request and response types of the engine:
//! - [`IoEntry`] - one register operation inside a transaction
//! - [`TransactionInfo`] - caller-supplied request (trigger + entries + emit ids)
//! - [`TransactionInfoBuilder`] - fluent construction of a request
//! - [`TransactionResponse`] / [`IoResult`] - the single completion record

mod builder;
mod info;
mod io_entry;
mod response;

pub use builder::TransactionInfoBuilder;
pub use info::{EventCounter, TransactionInfo, Trigger};
pub use io_entry::IoEntry;
pub use response::{IoResult, RESPONSE_HEADER_SIZE, RESULT_HEADER_SIZE, TransactionResponse};

/// Per-client transaction identifier, assigned at submit time.
pub type TransactionId = i64;

/// Identifier of an asynchronous event (trigger or completion).
pub type EventId = i64;

/// Register bank identifier.
pub type BankId = i32;

/// Device identifier of a trigger source.
pub type DeviceId = i32;

/// Event id meaning "no event".
pub const EVENT_ID_NONE: EventId = 0;
