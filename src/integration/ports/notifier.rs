//! Event bus port.

use crate::integration::domain::IntegrationEventEnvelope;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for event notifier operations.
pub type NotifierResult<T> = Result<T, NotifierError>;

/// Fire-and-forget broadcast of named integration events.
#[async_trait]
pub trait EventNotifier: Send + Sync {
    /// Publishes one event.
    async fn fire(&self, event: &IntegrationEventEnvelope) -> NotifierResult<()>;
}

/// Errors returned by event notifiers.
#[derive(Debug, Clone, Error)]
pub enum NotifierError {
    /// The bus rejected or could not deliver the event.
    #[error("event delivery failed for '{event_name}': {source}")]
    Delivery {
        /// Name of the undelivered event.
        event_name: String,
        /// Underlying bus error.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl NotifierError {
    /// Wraps a bus error for the named event.
    pub fn delivery(
        event_name: impl Into<String>,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Delivery {
            event_name: event_name.into(),
            source: Arc::new(err),
        }
    }
}
