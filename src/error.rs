//! Error types used by the transaction engine and register backends.
//!
//! This module defines three error enums:
//!
//! - [`SubmitError`] - errors returned synchronously by the control surface
//!   (`submit`, `cancel`, `replace`).
//! - [`RegisterError`] - errors raised while executing an IoEntry against a
//!   backend. They never reach the submitter directly; their numeric
//!   [`code`](RegisterError::code) is recorded in the response header.
//! - [`DecodeError`] - malformed completion payloads.
//!
//! All types provide `as_label` for logs/metrics.

use std::time::Duration;
use thiserror::Error;

use crate::transactions::{BankId, TransactionId};

/// `-EIO`.
pub const ERRNO_IO: i32 = -5;
/// `-EINVAL`.
pub const ERRNO_INVAL: i32 = -22;
/// `-ERANGE`.
pub const ERRNO_RANGE: i32 = -34;
/// `-ETIMEDOUT`.
pub const ERRNO_TIMEDOUT: i32 = -110;

/// # Errors produced by the control surface.
///
/// A submission that fails leaves no residual state: nothing is queued and
/// no id is consumed.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The request is malformed (empty entry list, zero-sized batch, ...).
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the request.
        reason: String,
    },

    /// The response buffer could not be allocated.
    #[error("resource exhausted: response of {requested} bytes (limit {limit})")]
    ResourceExhausted {
        /// Encoded response size the request needs.
        requested: usize,
        /// Configured limit (`0` when the allocator itself refused).
        limit: usize,
    },

    /// No pending transaction with this id (unknown, executing, or finished).
    #[error("transaction {id} not found")]
    NotFound {
        /// The id that was looked up.
        id: TransactionId,
    },

    /// The client has been shut down.
    #[error("client closed")]
    Closed,
}

impl SubmitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use regxact::SubmitError;
    ///
    /// let err = SubmitError::NotFound { id: 3 };
    /// assert_eq!(err.as_label(), "submit_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SubmitError::InvalidArgument { .. } => "submit_invalid_argument",
            SubmitError::ResourceExhausted { .. } => "submit_resource_exhausted",
            SubmitError::NotFound { .. } => "submit_not_found",
            SubmitError::Closed => "submit_closed",
        }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SubmitError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// # Errors produced by register access.
///
/// Raised by a [`RegisterIo`](crate::RegisterIo) backend or by the executor
/// itself (poll timeout).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// Backend-specific failure carrying its own numeric code.
    #[error("device error (code {code})")]
    Device {
        /// Negative errno-style code reported by the backend.
        code: i32,
    },

    /// A poll entry did not observe the expected value in time.
    #[error("poll timed out after {timeout:?}")]
    Timeout {
        /// The poll deadline that was exceeded.
        timeout: Duration,
    },

    /// The bank id does not exist on this device.
    #[error("unknown register bank {bank}")]
    UnknownBank {
        /// Requested bank.
        bank: BankId,
    },

    /// The access does not fit inside the bank.
    #[error("access of {width} bytes at {offset:#x} is outside bank {bank}")]
    OutOfRange {
        /// Requested bank.
        bank: BankId,
        /// Effective offset (bias applied).
        offset: u64,
        /// Access width in bytes.
        width: usize,
    },
}

impl RegisterError {
    /// Numeric code recorded in [`TransactionResponse::error_code`](crate::TransactionResponse).
    ///
    /// # Example
    /// ```
    /// use regxact::RegisterError;
    /// use std::time::Duration;
    ///
    /// assert_eq!(RegisterError::Device { code: -5 }.code(), -5);
    /// assert_eq!(RegisterError::Device { code: 0 }.code(), -5);
    /// assert_eq!(RegisterError::Timeout { timeout: Duration::from_millis(1) }.code(), -110);
    /// ```
    ///
    /// A device error reported with code `0` maps to `-EIO`, so a failed
    /// transaction never carries a success code.
    pub fn code(&self) -> i32 {
        match self {
            RegisterError::Device { code: 0 } => ERRNO_IO,
            RegisterError::Device { code } => *code,
            RegisterError::Timeout { .. } => ERRNO_TIMEDOUT,
            RegisterError::UnknownBank { .. } => ERRNO_INVAL,
            RegisterError::OutOfRange { .. } => ERRNO_RANGE,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegisterError::Device { .. } => "register_device",
            RegisterError::Timeout { .. } => "register_timeout",
            RegisterError::UnknownBank { .. } => "register_unknown_bank",
            RegisterError::OutOfRange { .. } => "register_out_of_range",
        }
    }

    /// Returns `true` for poll timeouts.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RegisterError::Timeout { .. })
    }
}

/// # Errors produced while decoding a completion payload.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the structure it announced.
    #[error("payload truncated: needed {needed} bytes, {available} available")]
    Truncated {
        /// Bytes required to continue.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// Header fields disagree with the result section.
    #[error("inconsistent payload: {reason}")]
    Inconsistent {
        /// Which field did not match.
        reason: &'static str,
    },
}

impl DecodeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DecodeError::Truncated { .. } => "decode_truncated",
            DecodeError::Inconsistent { .. } => "decode_inconsistent",
        }
    }
}
