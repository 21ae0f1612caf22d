//! Integration record aggregate shared by both ownership scopes.

use super::{
    IntegrationConfig, IntegrationId, IntegrationName, IntegrationRef, IntegrationSettings,
    IntegrationUid, Scope, SectionName,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Status assigned to records created without an explicit status.
pub const DEFAULT_STATUS: &str = "success";

/// A configured integration instance owned by the administration scope or by
/// one tenant.
///
/// `is_default` is the persisted flag. It is authoritative for
/// administration records only; tenant views derive defaults from pointers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    id: IntegrationId,
    uid: IntegrationUid,
    name: IntegrationName,
    scope: Scope,
    section: SectionName,
    settings: IntegrationSettings,
    config: IntegrationConfig,
    status: String,
    task_id: Option<String>,
    is_default: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted integration record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedIntegrationData {
    /// Persisted store identifier.
    pub id: IntegrationId,
    /// Persisted global uid.
    pub uid: IntegrationUid,
    /// Persisted type name.
    pub name: IntegrationName,
    /// Owning scope.
    pub scope: Scope,
    /// Persisted section name.
    pub section: SectionName,
    /// Persisted settings object.
    pub settings: IntegrationSettings,
    /// Persisted config object.
    pub config: IntegrationConfig,
    /// Persisted status string.
    pub status: String,
    /// Persisted background task reference.
    pub task_id: Option<String>,
    /// Persisted default flag.
    pub is_default: bool,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A record that has not been assigned a store identifier yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIntegration {
    /// Global uid.
    pub uid: IntegrationUid,
    /// Type name.
    pub name: IntegrationName,
    /// Owning scope.
    pub scope: Scope,
    /// Section of the type.
    pub section: SectionName,
    /// Initial settings, before secrets are moved into the vault.
    pub settings: IntegrationSettings,
    /// Initial config.
    pub config: IntegrationConfig,
    /// Initial status.
    pub status: String,
    /// Background task reference.
    pub task_id: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewIntegration {
    /// Creates an insert request stamped with the clock's current time.
    #[must_use]
    pub fn new(
        uid: IntegrationUid,
        name: IntegrationName,
        scope: Scope,
        section: SectionName,
        clock: &impl Clock,
    ) -> Self {
        Self {
            uid,
            name,
            scope,
            section,
            settings: IntegrationSettings::empty(),
            config: IntegrationConfig::default(),
            status: DEFAULT_STATUS.to_owned(),
            task_id: None,
            created_at: clock.utc(),
        }
    }

    /// Sets the initial settings.
    #[must_use]
    pub fn with_settings(mut self, settings: IntegrationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the initial config.
    #[must_use]
    pub fn with_config(mut self, config: IntegrationConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Sets the background task reference.
    #[must_use]
    pub fn with_task_id(mut self, task_id: Option<String>) -> Self {
        self.task_id = task_id;
        self
    }

    /// Builds the stored record once the store has assigned an id and
    /// decided the default flag.
    #[must_use]
    pub fn into_integration(self, id: IntegrationId, is_default: bool) -> Integration {
        Integration {
            id,
            uid: self.uid,
            name: self.name,
            scope: self.scope,
            section: self.section,
            settings: self.settings,
            config: self.config,
            status: self.status,
            task_id: self.task_id,
            is_default,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

impl Integration {
    /// Reconstructs a record from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedIntegrationData) -> Self {
        Self {
            id: data.id,
            uid: data.uid,
            name: data.name,
            scope: data.scope,
            section: data.section,
            settings: data.settings,
            config: data.config,
            status: data.status,
            task_id: data.task_id,
            is_default: data.is_default,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the store identifier.
    #[must_use]
    pub const fn id(&self) -> IntegrationId {
        self.id
    }

    /// Returns the global uid.
    #[must_use]
    pub const fn uid(&self) -> &IntegrationUid {
        &self.uid
    }

    /// Returns the type name.
    #[must_use]
    pub const fn name(&self) -> &IntegrationName {
        &self.name
    }

    /// Returns the owning scope.
    #[must_use]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    /// Returns the unambiguous address of this record.
    #[must_use]
    pub const fn reference(&self) -> IntegrationRef {
        IntegrationRef::new(self.scope, self.id)
    }

    /// Returns the section name.
    #[must_use]
    pub const fn section(&self) -> &SectionName {
        &self.section
    }

    /// Returns the settings envelope.
    #[must_use]
    pub const fn settings(&self) -> &IntegrationSettings {
        &self.settings
    }

    /// Returns the settings envelope mutably.
    pub const fn settings_mut(&mut self) -> &mut IntegrationSettings {
        &mut self.settings
    }

    /// Returns the config envelope.
    #[must_use]
    pub const fn config(&self) -> &IntegrationConfig {
        &self.config
    }

    /// Returns `true` for administration records shared with tenants.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.scope.is_administration() && self.config.is_shared()
    }

    /// Returns the status string.
    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns the background task reference.
    #[must_use]
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    /// Returns the persisted default flag.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.is_default
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the record with its settings swapped, keeping `updated_at`.
    ///
    /// Used for read-side views such as revealed secrets.
    #[must_use]
    pub fn with_settings(mut self, settings: IntegrationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the settings object.
    pub fn replace_settings(&mut self, settings: IntegrationSettings, clock: &impl Clock) {
        self.settings = settings;
        self.touch(clock);
    }

    /// Replaces the config object.
    pub fn replace_config(&mut self, config: IntegrationConfig, clock: &impl Clock) {
        self.config = config;
        self.touch(clock);
    }

    /// Fills in the `Integration #<id>` display name when none is set.
    pub fn ensure_display_name(&mut self, clock: &impl Clock) {
        self.config.ensure_display_name(self.id);
        self.touch(clock);
    }

    /// Replaces the status string.
    pub fn set_status(&mut self, status: impl Into<String>, clock: &impl Clock) {
        self.status = status.into();
        self.touch(clock);
    }

    /// Replaces the background task reference.
    pub fn set_task_id(&mut self, task_id: Option<String>, clock: &impl Clock) {
        self.task_id = task_id;
        self.touch(clock);
    }

    /// Overwrites the persisted default flag.
    ///
    /// Stores call this when they rewrite the administration default set.
    pub const fn set_default_flag(&mut self, is_default: bool) {
        self.is_default = is_default;
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
