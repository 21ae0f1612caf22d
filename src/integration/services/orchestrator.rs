//! Mutation orchestrator: create, update, delete and default promotion of
//! integration records, with secret handling and event fan-out.

use crate::integration::{
    domain::{
        DefaultPointer, Integration, IntegrationConfig, IntegrationEvent,
        IntegrationEventEnvelope, IntegrationRef, IntegrationSettings, IntegrationUid,
        NewIntegration, ProjectId, Scope,
    },
    ports::{EventNotifier, IntegrationStore, RecordFilter, SecretAdapter, TenantDirectory},
};
use mockable::Clock;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};

use super::{IntegrationCatalog, IntegrationServiceError, IntegrationServiceResult, OrchestratorConfig};

/// Request payload for creating or updating an integration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrationPayload {
    settings: Value,
    config: Option<Value>,
    status: Option<String>,
    uid: Option<String>,
    task_id: Option<String>,
    make_default: bool,
}

impl IntegrationPayload {
    /// Creates a payload carrying only settings.
    #[must_use]
    pub const fn new(settings: Value) -> Self {
        Self {
            settings,
            config: None,
            status: None,
            uid: None,
            task_id: None,
            make_default: false,
        }
    }

    /// Sets the config object.
    #[must_use]
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the status string.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Supplies the uid instead of generating one. Ignored on update.
    #[must_use]
    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    /// Sets the background task reference.
    #[must_use]
    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    /// Promotes the record to default within its owner scope once saved.
    #[must_use]
    pub const fn make_default(mut self) -> Self {
        self.make_default = true;
        self
    }
}

struct SettingsAudience {
    project_ids: Vec<ProjectId>,
    new_settings: Value,
}

/// Write-side service for integration records.
#[derive(Clone)]
pub struct IntegrationOrchestrator<S, V, N, D, C>
where
    S: IntegrationStore,
    V: SecretAdapter,
    N: EventNotifier,
    D: TenantDirectory,
    C: Clock + Send + Sync,
{
    catalog: Arc<IntegrationCatalog>,
    store: Arc<S>,
    secrets: Arc<V>,
    notifier: Arc<N>,
    directory: Arc<D>,
    clock: Arc<C>,
    config: OrchestratorConfig,
}

impl<S, V, N, D, C> IntegrationOrchestrator<S, V, N, D, C>
where
    S: IntegrationStore,
    V: SecretAdapter,
    N: EventNotifier,
    D: TenantDirectory,
    C: Clock + Send + Sync,
{
    /// Creates an orchestrator with the default configuration.
    #[must_use]
    pub fn new(
        catalog: Arc<IntegrationCatalog>,
        store: Arc<S>,
        secrets: Arc<V>,
        notifier: Arc<N>,
        directory: Arc<D>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            catalog,
            store,
            secrets,
            notifier,
            directory,
            clock,
            config: OrchestratorConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Creates a record of type `name` owned by `scope`.
    ///
    /// The store decides first-of-kind defaulting during insert. When a
    /// later step fails the inserted record is deleted again before the
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationServiceError::UnknownType`] for unregistered
    /// types, [`IntegrationServiceError::Validation`] when the settings fail
    /// the create schema, and [`IntegrationServiceError::NotificationFailed`]
    /// when the record was saved but its event was not delivered.
    pub async fn create(
        &self,
        name: &str,
        scope: Scope,
        payload: IntegrationPayload,
    ) -> IntegrationServiceResult<Integration> {
        let descriptor = self
            .catalog
            .get(name)
            .ok_or_else(|| IntegrationServiceError::UnknownType(name.to_owned()))?;
        let IntegrationPayload {
            settings: raw_settings,
            config: raw_config,
            status: requested_status,
            uid: requested_uid,
            task_id,
            make_default,
        } = payload;

        let settings =
            IntegrationSettings::new(descriptor.create_schema.validate(&raw_settings)?)?;
        let config = IntegrationConfig::new(raw_config.unwrap_or(Value::Null))?;
        let uid =
            requested_uid.map_or_else(|| Ok(IntegrationUid::generate()), IntegrationUid::new)?;
        let status = requested_status.unwrap_or_else(|| self.config.default_status.clone());

        let request = NewIntegration::new(
            uid,
            descriptor.name,
            scope,
            descriptor.section,
            &*self.clock,
        )
        .with_settings(settings)
        .with_config(config)
        .with_status(status)
        .with_task_id(task_id);
        let inserted = self.store.insert(request).await?;
        let target = inserted.reference();

        let created = match self.complete_create(inserted, make_default).await {
            Ok(created) => created,
            Err(err) => {
                self.compensate(target).await;
                return Err(err);
            }
        };

        info!(
            integration = %target,
            name = %created.name(),
            uid = %created.uid(),
            "created integration"
        );
        let event = IntegrationEventEnvelope::created_or_updated(&created, self.clock.utc());
        self.publish(created, &event).await
    }

    /// Updates settings, config, status and task id of an existing record
    /// and broadcasts the settings change.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationServiceError::NotFound`] when the record is
    /// absent or its type is unregistered, and
    /// [`IntegrationServiceError::Validation`] when the settings fail the
    /// validate schema.
    pub async fn update(
        &self,
        target: IntegrationRef,
        payload: IntegrationPayload,
    ) -> IntegrationServiceResult<Integration> {
        let current = self.load(target).await?;
        let descriptor = self
            .catalog
            .get_by_name(current.name())
            .ok_or(IntegrationServiceError::NotFound(target))?;
        let IntegrationPayload {
            settings: raw_settings,
            config: raw_config,
            status: requested_status,
            task_id,
            make_default,
            ..
        } = payload;

        let incoming =
            IntegrationSettings::new(descriptor.validate_schema.validate(&raw_settings)?)?;
        let secured = self.secrets.replace(&current, incoming).await?;

        let mut updated = current.clone();
        updated.replace_settings(secured, &*self.clock);
        if let Some(value) = raw_config {
            updated.replace_config(IntegrationConfig::new(value)?, &*self.clock);
            updated.ensure_display_name(&*self.clock);
        }
        if let Some(value) = requested_status {
            updated.set_status(value, &*self.clock);
        }
        if task_id.is_some() {
            updated.set_task_id(task_id, &*self.clock);
        }

        let audience = self.settings_audience(&current, &updated).await?;
        let stored = self.persist(updated, make_default).await?;

        info!(
            integration = %target,
            recipients = audience.project_ids.len(),
            "updated integration"
        );
        let event = self.settings_changed(&current, audience);
        self.publish(stored, &event).await
    }

    /// Updates only status and task id. No event is fired.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationServiceError::NotFound`] when the record is
    /// absent or its type is unregistered.
    pub async fn update_attributes(
        &self,
        target: IntegrationRef,
        status: Option<String>,
        task_id: Option<String>,
    ) -> IntegrationServiceResult<Integration> {
        let mut record = self.load(target).await?;
        if let Some(value) = status {
            record.set_status(value, &*self.clock);
        }
        if task_id.is_some() {
            record.set_task_id(task_id, &*self.clock);
        }
        self.store.update(&record).await?;
        info!(integration = %target, status = record.status(), "updated integration attributes");
        Ok(record)
    }

    /// Deletes a record and every pointer targeting it.
    ///
    /// Defaults are not re-elected. Deleting a shared administration record
    /// tells every tenant that its settings are gone.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationServiceError::NotFound`] when the record is
    /// absent or its type is unregistered.
    pub async fn delete(&self, target: IntegrationRef) -> IntegrationServiceResult<Integration> {
        let record = self.load(target).await?;
        let recipients = if record.is_shared() {
            self.directory.list_projects().await?
        } else {
            Vec::new()
        };

        let deleted = self
            .store
            .delete(target)
            .await?
            .ok_or(IntegrationServiceError::NotFound(target))?;
        info!(integration = %target, name = %deleted.name(), "deleted integration");

        if !deleted.is_shared() {
            return Ok(deleted);
        }
        let audience = SettingsAudience {
            project_ids: recipients,
            new_settings: Value::Object(Map::new()),
        };
        let event = self.settings_changed(&deleted, audience);
        self.publish(deleted, &event).await
    }

    /// Makes `target` the default of its type within `within`.
    ///
    /// Inside a tenant the target must be one of the tenant's own records or
    /// a shared administration record; the tenant's pointer for the name is
    /// upserted. Inside the administration scope the target must be an
    /// administration record and the flag moves to it. Repeating the call
    /// changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationServiceError::NotFound`] when the target is
    /// absent, unregistered or not visible from `within`.
    pub async fn promote_default(
        &self,
        target: IntegrationRef,
        within: Scope,
    ) -> IntegrationServiceResult<Integration> {
        let record = self.load(target).await?;
        let visible = match (within, record.scope()) {
            (Scope::Administration, owner) => owner.is_administration(),
            (Scope::Tenant(project), Scope::Tenant(owner)) => project == owner,
            (Scope::Tenant(_), Scope::Administration) => record.is_shared(),
        };
        if !visible {
            return Err(IntegrationServiceError::NotFound(target));
        }

        let promoted = match within {
            Scope::Administration => self.store.promote_admin_default(record.id()).await?,
            Scope::Tenant(project) => {
                self.store.set_pointer(project, target).await?;
                record
            }
        };
        info!(integration = %target, scope = %within, "promoted default integration");
        Ok(promoted)
    }

    /// Gives a new tenant a pointer to every shared administration default
    /// whose type is registered, unless it already has one for that name.
    ///
    /// Returns the pointers created.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationServiceError::Store`] when the store fails.
    pub async fn seed_tenant_defaults(
        &self,
        project: ProjectId,
    ) -> IntegrationServiceResult<Vec<DefaultPointer>> {
        let existing = self.store.pointers(project).await?;
        let shared = self
            .store
            .list(Scope::Administration, &RecordFilter::all().shared())
            .await?;

        let mut created: Vec<DefaultPointer> = Vec::new();
        for record in shared
            .iter()
            .filter(|record| record.is_default() && self.catalog.contains(record.name()))
        {
            let covered = existing
                .iter()
                .chain(created.iter())
                .any(|pointer| pointer.name == *record.name());
            if covered {
                continue;
            }
            created.push(self.store.set_pointer(project, record.reference()).await?);
        }

        info!(project = %project, seeded = created.len(), "seeded tenant defaults");
        Ok(created)
    }

    async fn load(&self, target: IntegrationRef) -> IntegrationServiceResult<Integration> {
        self.store
            .find_by_id(target)
            .await?
            .filter(|record| self.catalog.contains(record.name()))
            .ok_or(IntegrationServiceError::NotFound(target))
    }

    async fn complete_create(
        &self,
        mut record: Integration,
        make_default: bool,
    ) -> IntegrationServiceResult<Integration> {
        let secured = self.secrets.store(&record).await?;
        record.replace_settings(secured, &*self.clock);
        record.ensure_display_name(&*self.clock);
        self.persist(record, make_default).await
    }

    /// Writes the record and, when requested, its promotion as one store unit.
    async fn persist(
        &self,
        record: Integration,
        make_default: bool,
    ) -> IntegrationServiceResult<Integration> {
        if make_default {
            return Ok(self.store.update_and_promote(&record).await?);
        }
        self.store.update(&record).await?;
        Ok(record)
    }

    async fn compensate(&self, target: IntegrationRef) {
        match self.store.delete(target).await {
            Ok(_) => warn!(integration = %target, "rolled back partially created integration"),
            Err(err) => warn!(
                integration = %target,
                error = %err,
                "failed to roll back partially created integration"
            ),
        }
    }

    async fn settings_audience(
        &self,
        before: &Integration,
        after: &Integration,
    ) -> IntegrationServiceResult<SettingsAudience> {
        let new_settings = after.settings().to_json();
        let Scope::Tenant(project) = before.scope() else {
            let (was_shared, is_shared) = (before.is_shared(), after.is_shared());
            if !was_shared && !is_shared {
                return Ok(SettingsAudience {
                    project_ids: Vec::new(),
                    new_settings,
                });
            }
            let project_ids = self.directory.list_projects().await?;
            return Ok(SettingsAudience {
                project_ids,
                new_settings: if is_shared {
                    new_settings
                } else {
                    Value::Object(Map::new())
                },
            });
        };
        Ok(SettingsAudience {
            project_ids: vec![project],
            new_settings,
        })
    }

    fn settings_changed(
        &self,
        before: &Integration,
        audience: SettingsAudience,
    ) -> IntegrationEventEnvelope {
        IntegrationEventEnvelope {
            event_name: self.config.settings_changed_event.clone(),
            payload: IntegrationEvent::SettingsChanged {
                project_ids: audience.project_ids,
                integration_uid: before.uid().clone(),
                old_settings: before.settings().to_json(),
                new_settings: audience.new_settings,
            },
            occurred_at: self.clock.utc(),
        }
    }

    async fn publish(
        &self,
        record: Integration,
        event: &IntegrationEventEnvelope,
    ) -> IntegrationServiceResult<Integration> {
        match self.notifier.fire(event).await {
            Ok(()) => Ok(record),
            Err(source) => {
                warn!(
                    integration = %record.reference(),
                    event = %event.event_name,
                    error = %source,
                    "integration event was not delivered"
                );
                Err(IntegrationServiceError::NotificationFailed {
                    integration: Box::new(record),
                    source,
                })
            }
        }
    }
}
