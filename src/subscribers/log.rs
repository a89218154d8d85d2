//! # LogWriter - completion event logger
//!
//! A minimal subscriber that logs incoming [`CompletionEvent`]s through
//! `tracing`. Use it for test or demo.
//!
//! ## Example output
//! ```text
//! INFO transaction completed event_id=100 transaction=0 results=1
//! WARN transaction failed event_id=101 transaction=1 error_code=-110 completion_index=0
//! ```

use crate::events::CompletionEvent;
use crate::subscribers::Subscribe;
use async_trait::async_trait;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &CompletionEvent) {
        let resp = &e.payload;
        if resp.is_success() {
            tracing::info!(
                event_id = e.event_id,
                transaction = resp.id,
                results = resp.num_entries,
                "transaction completed"
            );
        } else {
            tracing::warn!(
                event_id = e.event_id,
                transaction = resp.id,
                error_code = resp.error_code,
                completion_index = resp.completion_index,
                "transaction failed"
            );
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
