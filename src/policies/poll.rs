//! # Poll interval policy.
//!
//! [`PollPolicy`] controls how long the executor sleeps between two reads of a
//! [`IoEntry::Poll`](crate::IoEntry::Poll) entry. It is parameterized by:
//! - [`PollPolicy::first`] the initial interval;
//! - [`PollPolicy::factor`] the multiplicative growth factor;
//! - [`PollPolicy::max`] the interval cap.
//!
//! The interval after read `n` is `first × factor^n`, clamped to `max`. The
//! executor additionally clamps it to the time left before the entry's
//! deadline, so a poll never oversleeps its timeout.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use regxact::PollPolicy;
//!
//! let poll = PollPolicy {
//!     first: Duration::from_micros(10),
//!     max: Duration::from_micros(100),
//!     factor: 2.0,
//! };
//!
//! assert!(poll.next(1) > poll.next(0));
//! assert_eq!(poll.next(10), Duration::from_micros(100));
//! ```

use std::time::Duration;

/// Interval growth between poll reads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollPolicy {
    /// Sleep after the first unsuccessful read.
    pub first: Duration,
    /// Upper bound for any single sleep.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
}

impl Default for PollPolicy {
    /// Returns a policy with:
    /// - `first = 10µs`;
    /// - `factor = 2.0`;
    /// - `max = 1ms`.
    fn default() -> Self {
        Self {
            first: Duration::from_micros(10),
            max: Duration::from_millis(1),
            factor: 2.0,
        }
    }
}

impl PollPolicy {
    /// Computes the sleep after read number `attempt` (0-indexed).
    ///
    /// Results that are negative, non-finite or above `max` become `max`.
    pub fn next(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.first.as_secs_f64() * self.factor.powi(exp);
        Duration::try_from_secs_f64(secs).map_or(self.max, |pause| pause.min(self.max))
    }
}
