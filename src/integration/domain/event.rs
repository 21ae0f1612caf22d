//! Events broadcast after committed integration mutations.

use super::{Integration, IntegrationName, IntegrationUid, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Payload of an integration event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntegrationEvent {
    /// Full snapshot of a created or updated record.
    CreatedOrUpdated(Box<Integration>),
    /// Settings change fanned out to the affected tenants.
    SettingsChanged {
        /// Tenants that must refresh the integration.
        project_ids: Vec<ProjectId>,
        /// Uid of the changed record.
        integration_uid: IntegrationUid,
        /// Settings before the change.
        old_settings: Value,
        /// Settings after the change; `{}` when tenants lose access.
        new_settings: Value,
    },
}

/// Named event with its emission timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationEventEnvelope {
    /// Bus event name.
    pub event_name: String,
    /// Event payload.
    pub payload: IntegrationEvent,
    /// Emission timestamp.
    pub occurred_at: DateTime<Utc>,
}

impl IntegrationEventEnvelope {
    /// Builds the `{name}_created_or_updated` event for a record.
    #[must_use]
    pub fn created_or_updated(integration: &Integration, occurred_at: DateTime<Utc>) -> Self {
        Self {
            event_name: created_or_updated_event_name(integration.name()),
            payload: IntegrationEvent::CreatedOrUpdated(Box::new(integration.clone())),
            occurred_at,
        }
    }

    /// Returns the tenants addressed by a settings change, if this is one.
    #[must_use]
    pub fn project_ids(&self) -> Option<&[ProjectId]> {
        match &self.payload {
            IntegrationEvent::SettingsChanged { project_ids, .. } => Some(project_ids),
            IntegrationEvent::CreatedOrUpdated(_) => None,
        }
    }
}

/// Returns the event name announcing a created or updated record of a type.
#[must_use]
pub fn created_or_updated_event_name(name: &IntegrationName) -> String {
    format!("{name}_created_or_updated")
}
