//! Event notifier that records every fired event.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::integration::{
    domain::IntegrationEventEnvelope,
    ports::{EventNotifier, NotifierError, NotifierResult},
};

/// Thread-safe [`EventNotifier`] keeping fired events in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<RwLock<Vec<IntegrationEventEnvelope>>>,
}

impl RecordingNotifier {
    /// Creates a notifier with no recorded events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every recorded event in firing order.
    #[must_use]
    pub fn events(&self) -> Vec<IntegrationEventEnvelope> {
        self.events
            .read()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Returns the recorded events carrying `event_name`.
    #[must_use]
    pub fn events_named(&self, event_name: &str) -> Vec<IntegrationEventEnvelope> {
        self.events()
            .into_iter()
            .filter(|event| event.event_name == event_name)
            .collect()
    }
}

#[async_trait]
impl EventNotifier for RecordingNotifier {
    async fn fire(&self, event: &IntegrationEventEnvelope) -> NotifierResult<()> {
        let mut events = self.events.write().map_err(|err| {
            NotifierError::delivery(
                event.event_name.clone(),
                std::io::Error::other(err.to_string()),
            )
        })?;
        events.push(event.clone());
        Ok(())
    }
}
