//! # Register operations.
//!
//! [`IoEntry`] is one step of a transaction. Entries are executed strictly in
//! the order they were supplied; nothing is reordered or merged.
//!
//! Only [`IoEntry::Read`] and [`IoEntry::ReadBatch`] produce results. Each of
//! them consumes exactly one slot of the response.

use std::time::Duration;

use super::BankId;

/// One register operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IoEntry {
    /// Read one register of the client's access width.
    Read { bank: BankId, offset: u64 },
    /// Read `size` consecutive bytes.
    ReadBatch {
        bank: BankId,
        offset: u64,
        size: usize,
    },
    /// Write one register.
    Write {
        bank: BankId,
        offset: u64,
        value: u64,
    },
    /// Write consecutive bytes.
    WriteBatch {
        bank: BankId,
        offset: u64,
        bytes: Vec<u8>,
    },
    /// Read-modify-write: `(current & !mask) | (value & mask)`.
    Modify {
        bank: BankId,
        offset: u64,
        value: u64,
        mask: u64,
    },
    /// Offset bias added to every following entry of the same transaction.
    SetBias { bias: u64 },
    /// Re-read until `(read & mask) == (value & mask)` or `timeout` elapses.
    Poll {
        bank: BankId,
        offset: u64,
        value: u64,
        mask: u64,
        timeout: Duration,
    },
}

impl IoEntry {
    /// Shorthand for [`IoEntry::Read`].
    pub fn read(bank: BankId, offset: u64) -> Self {
        IoEntry::Read { bank, offset }
    }

    /// Shorthand for [`IoEntry::Write`].
    pub fn write(bank: BankId, offset: u64, value: u64) -> Self {
        IoEntry::Write {
            bank,
            offset,
            value,
        }
    }

    /// Shorthand for [`IoEntry::Modify`].
    pub fn modify(bank: BankId, offset: u64, value: u64, mask: u64) -> Self {
        IoEntry::Modify {
            bank,
            offset,
            value,
            mask,
        }
    }

    /// Shorthand for [`IoEntry::Poll`].
    pub fn poll(bank: BankId, offset: u64, value: u64, mask: u64, timeout: Duration) -> Self {
        IoEntry::Poll {
            bank,
            offset,
            value,
            mask,
            timeout,
        }
    }

    /// Whether this entry fills a response slot.
    #[inline]
    pub fn is_read(&self) -> bool {
        matches!(self, IoEntry::Read { .. } | IoEntry::ReadBatch { .. })
    }

    /// Number of value bytes this entry writes into its response slot.
    ///
    /// `None` for entries without a slot.
    pub fn result_width(&self, access_width: usize) -> Option<usize> {
        match self {
            IoEntry::Read { .. } => Some(access_width),
            IoEntry::ReadBatch { size, .. } => Some(*size),
            _ => None,
        }
    }

    /// Bank and offset as requested (bias not applied).
    pub fn target(&self) -> Option<(BankId, u64)> {
        match self {
            IoEntry::Read { bank, offset }
            | IoEntry::ReadBatch { bank, offset, .. }
            | IoEntry::Write { bank, offset, .. }
            | IoEntry::WriteBatch { bank, offset, .. }
            | IoEntry::Modify { bank, offset, .. }
            | IoEntry::Poll { bank, offset, .. } => Some((*bank, *offset)),
            IoEntry::SetBias { .. } => None,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            IoEntry::Read { .. } => "read",
            IoEntry::ReadBatch { .. } => "read_batch",
            IoEntry::Write { .. } => "write",
            IoEntry::WriteBatch { .. } => "write_batch",
            IoEntry::Modify { .. } => "modify",
            IoEntry::SetBias { .. } => "set_bias",
            IoEntry::Poll { .. } => "poll",
        }
    }
}
