//! Engine core: transaction queues, dispatch and the client surface.
//!
//! The only public API from this module is [`Client`] (with its
//! [`ClientBuilder`] and [`ClientConfig`]).
//!
//! Internal modules:
//! - [`admission`]: validates requests and allocates their responses;
//! - [`table`]: trigger index, ready queue and ownership tracking;
//! - [`runner`]: executes one transaction and builds its completion;
//! - [`dispatcher`]: per-client worker draining the ready queue;
//! - [`client`]: submission, cancellation and event delivery.

mod admission;
mod builder;
mod client;
mod config;
mod dispatcher;
mod runner;
mod table;

pub use builder::ClientBuilder;
pub use client::Client;
pub use config::ClientConfig;
