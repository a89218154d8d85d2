//! # Client configuration.
//!
//! Provides [`ClientConfig`] centralized settings for one client session.
//!
//! ## Sentinel values
//! - `max_entries = 0` → unlimited entries per transaction
//! - `max_response_bytes = 0` → no cap on the encoded response size

use crate::policies::PollPolicy;

/// Configuration of a client session.
///
/// Defines:
/// - **Event system**: bus capacity for completion delivery
/// - **Register access**: access width in bytes, poll interval policy
/// - **Admission limits**: entries per transaction, response size
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Capacity of the completion bus ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events observe
    /// `Lagged` and skip older items. Minimum value is 1 (enforced by Bus).
    pub bus_capacity: usize,

    /// Width in bytes of single register accesses (`Read`, `Write`, `Modify`, `Poll`).
    ///
    /// Clamped to `1..=8`.
    pub access_width: usize,

    /// Maximum number of entries per transaction (`0` = unlimited).
    ///
    /// Exceeding it is an `InvalidArgument` at submit time.
    pub max_entries: usize,

    /// Maximum encoded response size in bytes (`0` = unlimited).
    ///
    /// Exceeding it is a `ResourceExhausted` at submit time.
    pub max_response_bytes: usize,

    /// Sleep policy between two reads of a poll entry.
    pub poll: PollPolicy,
}

impl ClientConfig {
    /// Returns the entry limit as an `Option`.
    #[inline]
    pub fn entry_limit(&self) -> Option<usize> {
        if self.max_entries == 0 {
            None
        } else {
            Some(self.max_entries)
        }
    }

    /// Returns the response size limit as an `Option`.
    #[inline]
    pub fn response_limit(&self) -> Option<usize> {
        if self.max_response_bytes == 0 {
            None
        } else {
            Some(self.max_response_bytes)
        }
    }

    /// Returns the access width clamped to `1..=8` bytes.
    #[inline]
    pub fn access_width_clamped(&self) -> usize {
        self.access_width.clamp(1, 8)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for ClientConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `access_width = 4` (32-bit registers)
    /// - `max_entries = 0` (unlimited)
    /// - `max_response_bytes = 0` (unlimited)
    /// - `poll = PollPolicy::default()`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            access_width: 4,
            max_entries: 0,
            max_response_bytes: 0,
            poll: PollPolicy::default(),
        }
    }
}
