//! # IoEntry executor.
//!
//! Runs an ordered entry list against a [`RegisterIo`] backend, filling the
//! response slots of read-producing entries.
//!
//! ## Flow
//! ```text
//! for entry in entries (in order):
//!   SetBias    → bias = entry.bias                  (no backend call)
//!   Write      → write(offset + bias)
//!   WriteBatch → write_batch(offset + bias)
//!   Read       → read(offset + bias)   → slots[cursor++]
//!   ReadBatch  → read_batch(...)       → slots[cursor++]
//!   Modify     → read → merge → write  (write skipped if read fails)
//!   Poll       → read until masked match or timeout (sleep per PollPolicy)
//!   on error   → stop, remaining entries are skipped, nothing rolled back
//! ```
//!
//! ## Rules
//! - The slot cursor advances even when a read fails, so slot `i` always
//!   belongs to the `i`-th read-producing entry.
//! - Poll sleeps block the calling thread.
//! - A poll timeout too large for [`Instant`] means no deadline.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::RegisterError;
use crate::io::RegisterIo;
use crate::policies::PollPolicy;
use crate::transactions::{BankId, IoEntry, IoResult};

/// Execution parameters derived from the client configuration.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ExecOptions {
    /// Register access width in bytes (1..=8).
    pub access_width: usize,
    /// Sleep policy between poll reads.
    pub poll: PollPolicy,
}

/// Result of running an entry list.
#[derive(Debug)]
pub(crate) struct Execution {
    /// Number of entries that completed.
    pub completed: usize,
    /// First failure, if any.
    pub error: Option<RegisterError>,
}

impl Execution {
    /// Index of the last completed entry, `-1` if none.
    pub fn completion_index(&self) -> i32 {
        i32::try_from(self.completed).map_or(i32::MAX, |n| n - 1)
    }
}

/// Executes `entries` in order.
///
/// `slots` must hold one result per read-producing entry (as allocated by
/// the response).
pub(crate) fn execute(
    io: &dyn RegisterIo,
    opts: &ExecOptions,
    entries: &[IoEntry],
    slots: &mut [IoResult],
) -> Execution {
    let mut bias = 0u64;
    let mut cursor = 0usize;

    for (idx, entry) in entries.iter().enumerate() {
        let res = run_entry(io, opts, entry, &mut bias, slots, &mut cursor);
        if let Err(error) = res {
            return Execution {
                completed: idx,
                error: Some(error),
            };
        }
    }

    Execution {
        completed: entries.len(),
        error: None,
    }
}

/// Builds zeroed result slots for `entries` (used by the direct I/O path).
pub(crate) fn empty_slots(entries: &[IoEntry], access_width: usize) -> Vec<IoResult> {
    entries
        .iter()
        .filter_map(|e| {
            let width = e.result_width(access_width)?;
            let (bank, offset) = e.target()?;
            Some(IoResult {
                bank,
                offset,
                bytes: vec![0; width],
            })
        })
        .collect()
}

fn run_entry(
    io: &dyn RegisterIo,
    opts: &ExecOptions,
    entry: &IoEntry,
    bias: &mut u64,
    slots: &mut [IoResult],
    cursor: &mut usize,
) -> Result<(), RegisterError> {
    let width = opts.access_width;
    match entry {
        IoEntry::SetBias { bias: b } => {
            *bias = *b;
            Ok(())
        }
        IoEntry::Write {
            bank,
            offset,
            value,
        } => io.write(*bank, offset.wrapping_add(*bias), *value, width),
        IoEntry::WriteBatch {
            bank,
            offset,
            bytes,
        } => io.write_batch(*bank, offset.wrapping_add(*bias), bytes),
        IoEntry::Read { bank, offset } => {
            let offset = offset.wrapping_add(*bias);
            let slot = next_slot(slots, cursor, *bank, offset);
            let value = io.read(*bank, offset, width)?;
            let n = slot.bytes.len().min(8);
            slot.bytes[..n].copy_from_slice(&value.to_le_bytes()[..n]);
            Ok(())
        }
        IoEntry::ReadBatch { bank, offset, .. } => {
            let offset = offset.wrapping_add(*bias);
            let slot = next_slot(slots, cursor, *bank, offset);
            io.read_batch(*bank, offset, &mut slot.bytes)
        }
        IoEntry::Modify {
            bank,
            offset,
            value,
            mask,
        } => {
            let offset = offset.wrapping_add(*bias);
            let current = io.read(*bank, offset, width)?;
            let merged = (current & !mask) | (value & mask);
            io.write(*bank, offset, merged, width)
        }
        IoEntry::Poll {
            bank,
            offset,
            value,
            mask,
            timeout,
        } => poll(
            io,
            &opts.poll,
            *bank,
            offset.wrapping_add(*bias),
            width,
            value & mask,
            *mask,
            *timeout,
        ),
    }
}

fn next_slot<'a>(
    slots: &'a mut [IoResult],
    cursor: &mut usize,
    bank: BankId,
    offset: u64,
) -> &'a mut IoResult {
    let slot = &mut slots[*cursor];
    *cursor += 1;
    slot.bank = bank;
    slot.offset = offset;
    slot
}

#[allow(clippy::too_many_arguments)]
fn poll(
    io: &dyn RegisterIo,
    policy: &PollPolicy,
    bank: BankId,
    offset: u64,
    width: usize,
    expected: u64,
    mask: u64,
    timeout: Duration,
) -> Result<(), RegisterError> {
    // None: the timeout is past what Instant can represent, poll without deadline.
    let deadline = Instant::now().checked_add(timeout);
    let mut attempt = 0u32;

    loop {
        if io.read(bank, offset, width)? & mask == expected {
            return Ok(());
        }
        let mut pause = policy.next(attempt);
        if let Some(deadline) = deadline {
            let now = Instant::now();
            if now >= deadline {
                return Err(RegisterError::Timeout { timeout });
            }
            pause = pause.min(deadline - now);
        }
        thread::sleep(pause);
        attempt = attempt.saturating_add(1);
    }
}
