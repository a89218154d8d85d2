//! # Transaction response record.
//!
//! Every transaction produces exactly one [`TransactionResponse`]. Its shape
//! is fixed at submit time: one [`IoResult`] slot per read-producing entry,
//! sized by the entry's width. Execution only fills slots and sets the
//! header fields; it never grows or shrinks the record.
//!
//! ## Wire layout (little-endian)
//! ```text
//! header  : id i64 | error_code i32 | completion_index i32 | num_entries u64 | results_size_bytes u64
//! result* : bank i32 | offset u64 | num_value_bytes u64 | value bytes
//! ```

use crate::error::{DecodeError, SubmitError};

use super::{BankId, IoEntry, TransactionId};

/// Encoded size of the response header.
pub const RESPONSE_HEADER_SIZE: usize = 8 + 4 + 4 + 8 + 8;

/// Encoded size of a result header (value bytes excluded).
pub const RESULT_HEADER_SIZE: usize = 4 + 8 + 8;

/// Result of one read-producing entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IoResult {
    /// Bank that was read.
    pub bank: BankId,
    /// Effective offset (bias applied once executed).
    pub offset: u64,
    /// Raw value bytes, little-endian for single reads.
    pub bytes: Vec<u8>,
}

impl IoResult {
    /// Number of value bytes.
    #[inline]
    pub fn value_width(&self) -> usize {
        self.bytes.len()
    }

    /// Interprets up to the first eight bytes as a little-endian integer.
    pub fn value(&self) -> u64 {
        let mut raw = [0u8; 8];
        let n = self.bytes.len().min(8);
        raw[..n].copy_from_slice(&self.bytes[..n]);
        u64::from_le_bytes(raw)
    }

    fn encoded_len(&self) -> usize {
        RESULT_HEADER_SIZE + self.bytes.len()
    }
}

/// Completion record of a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionResponse {
    /// Id assigned at submit time.
    pub id: TransactionId,
    /// `0` on success, otherwise the first failure's code.
    pub error_code: i32,
    /// Index of the last entry that completed, `-1` if none did.
    pub completion_index: i32,
    /// Number of result slots (read-producing entries of the request).
    pub num_entries: usize,
    /// Encoded size of the result section.
    pub results_size_bytes: usize,
    /// One slot per read-producing entry, in request order.
    pub results: Vec<IoResult>,
}

impl TransactionResponse {
    /// Allocates the response for `entries`.
    ///
    /// Slots are pre-filled with the requested bank/offset and zeroed bytes.
    /// `limit` caps the encoded size (`None` = unlimited).
    pub(crate) fn allocate(
        id: TransactionId,
        entries: &[IoEntry],
        access_width: usize,
        limit: Option<usize>,
    ) -> Result<Self, SubmitError> {
        let slots: Vec<(BankId, u64, usize)> = entries
            .iter()
            .filter_map(|e| {
                let width = e.result_width(access_width)?;
                let (bank, offset) = e.target()?;
                Some((bank, offset, width))
            })
            .collect();

        let results_size_bytes = slots
            .iter()
            .fold(0usize, |acc, (_, _, w)| {
                acc.saturating_add(RESULT_HEADER_SIZE.saturating_add(*w))
            });
        let requested = RESPONSE_HEADER_SIZE.saturating_add(results_size_bytes);
        if let Some(limit) = limit {
            if requested > limit {
                return Err(SubmitError::ResourceExhausted { requested, limit });
            }
        }

        let exhausted = || SubmitError::ResourceExhausted {
            requested,
            limit: 0,
        };
        let mut results = Vec::new();
        results.try_reserve_exact(slots.len()).map_err(|_| exhausted())?;
        for (bank, offset, width) in slots {
            let mut bytes = Vec::new();
            bytes.try_reserve_exact(width).map_err(|_| exhausted())?;
            bytes.resize(width, 0);
            results.push(IoResult {
                bank,
                offset,
                bytes,
            });
        }

        Ok(Self {
            id,
            error_code: 0,
            completion_index: -1,
            num_entries: results.len(),
            results_size_bytes,
            results,
        })
    }

    /// Whether the transaction completed without error.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.error_code == 0
    }

    /// Total encoded size (header + results).
    pub fn encoded_len(&self) -> usize {
        RESPONSE_HEADER_SIZE + self.results_size_bytes
    }

    /// Encodes the response into its wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&self.id.to_le_bytes());
        out.extend_from_slice(&self.error_code.to_le_bytes());
        out.extend_from_slice(&self.completion_index.to_le_bytes());
        out.extend_from_slice(&(self.num_entries as u64).to_le_bytes());
        out.extend_from_slice(&(self.results_size_bytes as u64).to_le_bytes());
        for r in &self.results {
            out.extend_from_slice(&r.bank.to_le_bytes());
            out.extend_from_slice(&r.offset.to_le_bytes());
            out.extend_from_slice(&(r.bytes.len() as u64).to_le_bytes());
            out.extend_from_slice(&r.bytes);
        }
        out
    }

    /// Decodes a payload produced by [`encode`](Self::encode).
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let mut cur = Cursor { buf, pos: 0 };
        let id = i64::from_le_bytes(cur.take()?);
        let error_code = i32::from_le_bytes(cur.take()?);
        let completion_index = i32::from_le_bytes(cur.take()?);
        let num_entries = cur.take_len()?;
        let results_size_bytes = cur.take_len()?;

        let mut results = Vec::new();
        for _ in 0..num_entries {
            let bank = i32::from_le_bytes(cur.take()?);
            let offset = u64::from_le_bytes(cur.take()?);
            let width = cur.take_len()?;
            let bytes = cur.take_slice(width)?.to_vec();
            results.push(IoResult {
                bank,
                offset,
                bytes,
            });
        }

        if cur.pos != buf.len() {
            return Err(DecodeError::Inconsistent {
                reason: "trailing bytes after results",
            });
        }
        let actual: usize = results.iter().map(IoResult::encoded_len).sum();
        if actual != results_size_bytes {
            return Err(DecodeError::Inconsistent {
                reason: "results_size_bytes",
            });
        }

        Ok(Self {
            id,
            error_code,
            completion_index,
            num_entries,
            results_size_bytes,
            results,
        })
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take_slice(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let available = self.buf.len() - self.pos;
        if n > available {
            return Err(DecodeError::Truncated {
                needed: n,
                available,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut raw = [0u8; N];
        raw.copy_from_slice(self.take_slice(N)?);
        Ok(raw)
    }

    fn take_len(&mut self) -> Result<usize, DecodeError> {
        usize::try_from(u64::from_le_bytes(self.take()?)).map_err(|_| DecodeError::Inconsistent {
            reason: "length does not fit in usize",
        })
    }
}
