//! Completion events: type and broadcast bus.
//!
//! This module is the engine's completion emitter. Finished transactions
//! are turned into [`CompletionEvent`]s and pushed onto the client's [`Bus`].
//!
//! ## Contents
//! - [`CompletionEvent`] event id + response payload + timestamp
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the dispatcher and `Client::on_event` (inline transactions).
//!   Both publish only while the client lock is released.
//! - **Consumers**: receivers from `Client::subscribe()` and the
//!   `SubscriberSet` listener.

mod bus;
mod event;

pub use bus::Bus;
pub use event::CompletionEvent;
pub(crate) use event::PendingEvent;
