use std::sync::Arc;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_util::sync::CancellationToken;

use super::client::{Client, Shared, Worker};
use super::dispatcher;
use crate::{
    core::ClientConfig,
    events::Bus,
    io::RegisterIo,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Client`] with optional subscribers.
pub struct ClientBuilder {
    cfg: ClientConfig,
    io: Arc<dyn RegisterIo>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl ClientBuilder {
    /// Creates a new builder with the given configuration and backend.
    pub fn new(cfg: ClientConfig, io: Arc<dyn RegisterIo>) -> Self {
        Self {
            cfg,
            io,
            subscribers: Vec::new(),
        }
    }

    /// Sets completion subscribers.
    ///
    /// Subscribers receive every completion event through dedicated workers
    /// with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the client and spawns its background tasks.
    ///
    /// Must be called from within a tokio runtime:
    /// - the dispatcher worker
    /// - a subscriber listener (only when subscribers are configured)
    pub fn build(self) -> Arc<Client> {
        let shared = Arc::new(Shared::new(self.cfg, self.io));

        let token = CancellationToken::new();
        let dispatcher = Worker {
            join: dispatcher::spawn(Arc::clone(&shared), token.clone()),
            token,
        };

        let listener = if self.subscribers.is_empty() {
            None
        } else {
            let set = SubscriberSet::new(self.subscribers);
            Some(subscriber_listener(&shared.bus, set))
        };

        tracing::debug!(backend = shared.io.name(), "client started");
        Arc::new(Client::new_internal(shared, dispatcher, listener))
    }
}

/// Forwards bus events to the subscriber set until cancelled.
///
/// On cancellation, events already on the bus are still forwarded before
/// the subscriber workers are shut down.
fn subscriber_listener(bus: &Bus, set: SubscriberSet) -> Worker {
    let mut rx = bus.subscribe();
    let token = CancellationToken::new();
    let stop = token.clone();

    let join = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = stop.cancelled() => break,
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged, events skipped");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        loop {
            match rx.try_recv() {
                Ok(ev) => set.emit(&ev),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "subscriber listener lagged, events skipped");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    });

    Worker { token, join }
}
