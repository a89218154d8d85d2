//! # ScratchRegisters - in-memory register banks
//!
//! Each bank is a zero-initialised byte array. Multi-byte accesses are
//! little-endian. Use it for tests or demo.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::RegisterError;
use crate::io::RegisterIo;
use crate::transactions::BankId;

/// Byte-addressed scratch memory posing as register space.
#[derive(Debug, Default)]
pub struct ScratchRegisters {
    banks: Mutex<HashMap<BankId, Vec<u8>>>,
}

impl ScratchRegisters {
    /// Creates banks `0..sizes.len()` with the given sizes in bytes.
    #[must_use]
    pub fn new(sizes: &[usize]) -> Self {
        let banks = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| (i as BankId, vec![0u8; *size]))
            .collect();
        Self {
            banks: Mutex::new(banks),
        }
    }

    /// Adds (or resets) bank `bank` with `size` zeroed bytes.
    #[must_use]
    pub fn with_bank(self, bank: BankId, size: usize) -> Self {
        self.banks.lock().insert(bank, vec![0u8; size]);
        self
    }

    /// Copy of a bank's contents.
    pub fn snapshot(&self, bank: BankId) -> Option<Vec<u8>> {
        self.banks.lock().get(&bank).cloned()
    }

    fn with_span<R>(
        &self,
        bank: BankId,
        offset: u64,
        width: usize,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R, RegisterError> {
        let mut banks = self.banks.lock();
        let mem = banks.get_mut(&bank).ok_or(RegisterError::UnknownBank { bank })?;
        let out_of_range = RegisterError::OutOfRange {
            bank,
            offset,
            width,
        };
        let start = usize::try_from(offset).map_err(|_| out_of_range.clone())?;
        let end = start.checked_add(width).ok_or_else(|| out_of_range.clone())?;
        let span = mem.get_mut(start..end).ok_or(out_of_range)?;
        Ok(f(span))
    }
}

impl RegisterIo for ScratchRegisters {
    fn read(&self, bank: BankId, offset: u64, width: usize) -> Result<u64, RegisterError> {
        let width = width.min(8);
        self.with_span(bank, offset, width, |span| {
            let mut raw = [0u8; 8];
            raw[..span.len()].copy_from_slice(span);
            u64::from_le_bytes(raw)
        })
    }

    fn write(
        &self,
        bank: BankId,
        offset: u64,
        value: u64,
        width: usize,
    ) -> Result<(), RegisterError> {
        let width = width.min(8);
        self.with_span(bank, offset, width, |span| {
            span.copy_from_slice(&value.to_le_bytes()[..span.len()]);
        })
    }

    fn read_batch(&self, bank: BankId, offset: u64, buf: &mut [u8]) -> Result<(), RegisterError> {
        self.with_span(bank, offset, buf.len(), |span| buf.copy_from_slice(span))
    }

    fn write_batch(&self, bank: BankId, offset: u64, bytes: &[u8]) -> Result<(), RegisterError> {
        self.with_span(bank, offset, bytes.len(), |span| span.copy_from_slice(bytes))
    }

    fn name(&self) -> &'static str {
        "scratch"
    }
}
