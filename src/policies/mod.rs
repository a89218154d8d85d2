//! Execution policies.
//!
//! ## Contents
//! - [`PollPolicy`] how the sleep between two reads of a poll entry evolves
//!   (first / factor / max)
//!
//! ## Quick wiring
//! ```text
//! ClientConfig { poll: PollPolicy, .. }
//!      └─► io::executor uses poll.next(attempt) between unsuccessful reads,
//!          clamped to the time left before the entry's timeout
//! ```
//!
//! ## Defaults
//! - `PollPolicy::default()` → first=10µs, factor=2.0, max=1ms.

mod poll;

pub use poll::PollPolicy;
