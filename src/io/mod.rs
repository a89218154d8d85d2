//! # Register access.
//!
//! The engine never talks to hardware directly. It drives a [`RegisterIo`]
//! backend through the entry executor:
//!
//! ```text
//! Dispatcher / on_event / register_io
//!        └─► executor::execute(entries)
//!               ├─► RegisterIo::read / write             (Read, Write, Modify, Poll)
//!               └─► RegisterIo::read_batch / write_batch (ReadBatch, WriteBatch)
//! ```
//!
//! - [`RegisterIo`] the backend seam (single and batch accessors);
//! - [`ScratchRegisters`] zero-initialised in-memory banks, used for tests and demos.
//!
//! Mutual exclusion between clients sharing one device is the backend's job.

pub(crate) mod executor;
mod scratch;

pub use scratch::ScratchRegisters;

use crate::error::RegisterError;
use crate::transactions::BankId;

/// Register-access backend.
///
/// Calls may block (bus transfers, slow devices); the engine only invokes
/// them outside its client lock and, for deferred transactions, on a
/// blocking thread.
pub trait RegisterIo: Send + Sync + 'static {
    /// Reads `width` bytes at `offset` and returns them as a little-endian value.
    fn read(&self, bank: BankId, offset: u64, width: usize) -> Result<u64, RegisterError>;

    /// Writes the low `width` bytes of `value` at `offset`.
    fn write(&self, bank: BankId, offset: u64, value: u64, width: usize)
    -> Result<(), RegisterError>;

    /// Fills `buf` from consecutive bytes starting at `offset`.
    ///
    /// The default issues one single-byte read per byte.
    fn read_batch(&self, bank: BankId, offset: u64, buf: &mut [u8]) -> Result<(), RegisterError> {
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.read(bank, offset.wrapping_add(i as u64), 1)? as u8;
        }
        Ok(())
    }

    /// Writes `bytes` to consecutive bytes starting at `offset`.
    ///
    /// The default issues one single-byte write per byte.
    fn write_batch(&self, bank: BankId, offset: u64, bytes: &[u8]) -> Result<(), RegisterError> {
        for (i, byte) in bytes.iter().enumerate() {
            self.write(bank, offset.wrapping_add(i as u64), u64::from(*byte), 1)?;
        }
        Ok(())
    }

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
