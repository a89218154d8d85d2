//! # Completion event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used by a client to hand completion events to consumers.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Dispatcher ── publish(CompletionEvent) ──► Bus ──► subscriber_listener
//!                                                          │
//!                                                          ▼
//!                                                   SubscriberSet::emit
//!                                                ┌─────────┼─────────┐
//!                                                ▼         ▼         ▼
//!                                            LogWriter   Custom    ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use regxact::{CompletionEvent, Subscribe};
//! use async_trait::async_trait;
//!
//! struct Failures;
//!
//! #[async_trait]
//! impl Subscribe for Failures {
//!     async fn on_event(&self, event: &CompletionEvent) {
//!         eprintln!("transaction {} failed: {}", event.transaction_id(), event.payload.error_code);
//!     }
//!     fn accepts(&self, event_id: i64) -> bool {
//!         event_id == 101
//!     }
//! }
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub use subscriber_set::{DeliveryStats, SubscriberSet};
pub(crate) use subscriber_set::panic_message;
