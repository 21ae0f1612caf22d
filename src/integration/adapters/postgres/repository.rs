//! `PostgreSQL` record store for integrations and default pointers.

use super::{
    models::{
        DefaultPointerRow, IntegrationRow, IssuedUidRow, NewDefaultPointerRow,
        NewIntegrationRow, NewProjectIntegrationRow, ProjectIntegrationRow,
    },
    schema::{integration_defaults, integration_uids, integrations, project_integrations},
};
use crate::integration::{
    domain::{
        DefaultPointer, Integration, IntegrationConfig, IntegrationId, IntegrationName,
        IntegrationRef, IntegrationSettings, IntegrationUid, NewIntegration,
        PersistedIntegrationData, PointerId, ProjectId, Scope, SectionName,
    },
    ports::{IntegrationStore, IntegrationStoreError, IntegrationStoreResult, RecordFilter},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Text;
use serde_json::Value;

/// `PostgreSQL` connection pool type used by the integration store.
pub type IntegrationPgPool = Pool<ConnectionManager<PgConnection>>;

const UID_LEDGER_CONSTRAINT: &str = "integration_uids_pkey";
const ADMIN_UID_CONSTRAINT: &str = "integrations_uid_key";
const PROJECT_UID_CONSTRAINT: &str = "project_integrations_uid_key";
const ADMIN_DEFAULT_CONSTRAINT: &str = "ix_default_uc";
const PROJECT_DEFAULT_CONSTRAINT: &str = "ix_project_default_uc";
const DEFAULT_SLOT_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtextextended($1, 0))";

impl From<DieselError> for IntegrationStoreError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

/// `PostgreSQL`-backed [`IntegrationStore`].
///
/// Administration records live in `integrations`, tenant records in
/// `project_integrations` keyed by `project_id`, and default pointers in
/// `integration_defaults`. Each trait call runs in one transaction.
#[derive(Debug, Clone)]
pub struct PostgresIntegrationStore {
    pool: IntegrationPgPool,
}

impl PostgresIntegrationStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: IntegrationPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> IntegrationStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> IntegrationStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(IntegrationStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(IntegrationStoreError::persistence)?
    }
}

#[async_trait]
impl IntegrationStore for PostgresIntegrationStore {
    async fn insert(&self, integration: NewIntegration) -> IntegrationStoreResult<Integration> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, IntegrationStoreError, _>(|tx| {
                diesel::insert_into(integration_uids::table)
                    .values(&IssuedUidRow {
                        uid: integration.uid.as_str().to_owned(),
                    })
                    .execute(tx)
                    .map_err(|err| map_insert_error(err, &integration))?;

                match integration.scope {
                    Scope::Administration => insert_admin_record(tx, &integration),
                    Scope::Tenant(project) => insert_project_record(tx, project, &integration),
                }
            })
        })
        .await
    }

    async fn update(&self, integration: &Integration) -> IntegrationStoreResult<()> {
        let record = integration.clone();
        self.run_blocking(move |connection| write_record(connection, &record))
            .await
    }

    async fn update_and_promote(
        &self,
        integration: &Integration,
    ) -> IntegrationStoreResult<Integration> {
        let record = integration.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, IntegrationStoreError, _>(|tx| {
                write_record(tx, &record)?;
                let target = record.reference();
                match target.owner {
                    Scope::Administration => promote_admin_row(tx, target.id),
                    Scope::Tenant(tenant) => {
                        let stored = load_record(tx, target)?
                            .ok_or(IntegrationStoreError::NotFound(target))?;
                        upsert_pointer(tx, tenant, &stored)?;
                        Ok(stored)
                    }
                }
            })
        })
        .await
    }

    async fn delete(&self, target: IntegrationRef) -> IntegrationStoreResult<Option<Integration>> {
        self.run_blocking(move |connection| {
            connection.transaction::<_, IntegrationStoreError, _>(|tx| {
                let Some(record) = load_record(tx, target)? else {
                    return Ok(None);
                };
                let id = target.id.into_inner();
                match target.owner {
                    Scope::Administration => {
                        diesel::delete(integrations::table.filter(integrations::id.eq(id)))
                            .execute(tx)?;
                        diesel::delete(
                            integration_defaults::table
                                .filter(integration_defaults::integration_id.eq(id))
                                .filter(integration_defaults::target_project_id.is_null()),
                        )
                        .execute(tx)?;
                    }
                    Scope::Tenant(project) => {
                        diesel::delete(
                            project_integrations::table
                                .filter(project_integrations::project_id.eq(project.into_inner()))
                                .filter(project_integrations::id.eq(id)),
                        )
                        .execute(tx)?;
                        diesel::delete(
                            integration_defaults::table
                                .filter(integration_defaults::integration_id.eq(id))
                                .filter(
                                    integration_defaults::target_project_id
                                        .eq(project.into_inner()),
                                ),
                        )
                        .execute(tx)?;
                    }
                }
                Ok(Some(record))
            })
        })
        .await
    }

    async fn find_by_id(
        &self,
        target: IntegrationRef,
    ) -> IntegrationStoreResult<Option<Integration>> {
        self.run_blocking(move |connection| load_record(connection, target))
            .await
    }

    async fn find_by_uid(
        &self,
        uid: &IntegrationUid,
        owner: Scope,
    ) -> IntegrationStoreResult<Option<Integration>> {
        let uid_value = uid.as_str().to_owned();
        self.run_blocking(move |connection| match owner {
            Scope::Administration => integrations::table
                .filter(integrations::uid.eq(&uid_value))
                .select(IntegrationRow::as_select())
                .first::<IntegrationRow>(connection)
                .optional()?
                .map(|row| row_to_integration(row, Scope::Administration))
                .transpose(),
            Scope::Tenant(project) => project_integrations::table
                .filter(project_integrations::project_id.eq(project.into_inner()))
                .filter(project_integrations::uid.eq(&uid_value))
                .select(ProjectIntegrationRow::as_select())
                .first::<ProjectIntegrationRow>(connection)
                .optional()?
                .map(project_row_to_integration)
                .transpose(),
        })
        .await
    }

    async fn list(
        &self,
        owner: Scope,
        filter: &RecordFilter,
    ) -> IntegrationStoreResult<Vec<Integration>> {
        let record_filter = filter.clone();
        self.run_blocking(move |connection| {
            let records = match owner {
                Scope::Administration => list_admin_records(connection, &record_filter)?,
                Scope::Tenant(project) => {
                    list_project_records(connection, project, &record_filter)?
                }
            };
            Ok(records
                .into_iter()
                .filter(|record| record_filter.matches(record))
                .collect())
        })
        .await
    }

    async fn pointers(&self, tenant: ProjectId) -> IntegrationStoreResult<Vec<DefaultPointer>> {
        self.run_blocking(move |connection| {
            let rows = integration_defaults::table
                .filter(integration_defaults::project_id.eq(tenant.into_inner()))
                .filter(integration_defaults::is_default.eq(true))
                .order(integration_defaults::id.asc())
                .select(DefaultPointerRow::as_select())
                .load::<DefaultPointerRow>(connection)?;
            rows.into_iter().map(row_to_pointer).collect()
        })
        .await
    }

    async fn set_pointer(
        &self,
        tenant: ProjectId,
        target: IntegrationRef,
    ) -> IntegrationStoreResult<DefaultPointer> {
        if matches!(target.owner, Scope::Tenant(owner) if owner != tenant) {
            return Err(IntegrationStoreError::NotFound(target));
        }
        self.run_blocking(move |connection| {
            connection.transaction::<_, IntegrationStoreError, _>(|tx| {
                let record =
                    load_record(tx, target)?.ok_or(IntegrationStoreError::NotFound(target))?;
                upsert_pointer(tx, tenant, &record)
            })
        })
        .await
    }

    async fn promote_admin_default(
        &self,
        id: IntegrationId,
    ) -> IntegrationStoreResult<Integration> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, IntegrationStoreError, _>(|tx| promote_admin_row(tx, id))
        })
        .await
    }
}

/// Persists the mutable columns of an existing record.
fn write_record(
    connection: &mut PgConnection,
    integration: &Integration,
) -> IntegrationStoreResult<()> {
    let target = integration.reference();
    let id = target.id.into_inner();
    let settings = integration.settings().to_json();
    let config = integration.config().to_json();
    let status = integration.status().to_owned();
    let task_id = integration.task_id().map(str::to_owned);
    let updated_at = integration.updated_at();

    let updated_count = match target.owner {
        Scope::Administration => {
            diesel::update(integrations::table.filter(integrations::id.eq(id)))
                .set((
                    integrations::settings.eq(&settings),
                    integrations::config.eq(&config),
                    integrations::status.eq(&status),
                    integrations::task_id.eq(&task_id),
                    integrations::updated_at.eq(updated_at),
                ))
                .execute(connection)
        }
        Scope::Tenant(project) => diesel::update(
            project_integrations::table
                .filter(project_integrations::project_id.eq(project.into_inner()))
                .filter(project_integrations::id.eq(id)),
        )
        .set((
            project_integrations::settings.eq(&settings),
            project_integrations::config.eq(&config),
            project_integrations::status.eq(&status),
            project_integrations::task_id.eq(&task_id),
            project_integrations::updated_at.eq(updated_at),
        ))
        .execute(connection),
    }?;

    if updated_count == 0 {
        return Err(IntegrationStoreError::NotFound(target));
    }
    Ok(())
}

/// Serializes first-of-kind checks and default moves for one name within one
/// owner scope until the surrounding transaction ends.
fn lock_default_slot(
    tx: &mut PgConnection,
    owner: Scope,
    name: &IntegrationName,
) -> IntegrationStoreResult<()> {
    diesel::sql_query(DEFAULT_SLOT_LOCK_SQL)
        .bind::<Text, _>(format!("integration-default:{owner}:{name}"))
        .execute(tx)?;
    Ok(())
}

fn promote_admin_row(
    tx: &mut PgConnection,
    id: IntegrationId,
) -> IntegrationStoreResult<Integration> {
    let target = IntegrationRef::administration(id);
    let raw_id = id.into_inner();
    let name = integrations::table
        .filter(integrations::id.eq(raw_id))
        .select(integrations::name)
        .first::<String>(tx)
        .optional()?
        .ok_or(IntegrationStoreError::NotFound(target))?;
    let slot = IntegrationName::new(name.clone())
        .map_err(IntegrationStoreError::invalid_persisted_data)?;
    lock_default_slot(tx, Scope::Administration, &slot)?;

    diesel::update(
        integrations::table
            .filter(integrations::name.eq(&name))
            .filter(integrations::id.ne(raw_id))
            .filter(integrations::is_default.eq(true)),
    )
    .set(integrations::is_default.eq(false))
    .execute(tx)?;

    let row = diesel::update(integrations::table.filter(integrations::id.eq(raw_id)))
        .set(integrations::is_default.eq(true))
        .returning(IntegrationRow::as_returning())
        .get_result::<IntegrationRow>(tx)?;
    row_to_integration(row, Scope::Administration)
}

fn insert_admin_record(
    tx: &mut PgConnection,
    integration: &NewIntegration,
) -> IntegrationStoreResult<Integration> {
    lock_default_slot(tx, Scope::Administration, &integration.name)?;
    let existing_defaults: i64 = integrations::table
        .filter(integrations::name.eq(integration.name.as_str()))
        .filter(integrations::is_default.eq(true))
        .count()
        .get_result(tx)?;

    let new_row = NewIntegrationRow {
        uid: integration.uid.as_str().to_owned(),
        name: integration.name.as_str().to_owned(),
        section: integration.section.as_str().to_owned(),
        settings: integration.settings.to_json(),
        config: integration.config.to_json(),
        status: integration.status.clone(),
        task_id: integration.task_id.clone(),
        is_default: existing_defaults == 0,
        created_at: integration.created_at,
        updated_at: integration.created_at,
    };
    let row = diesel::insert_into(integrations::table)
        .values(&new_row)
        .returning(IntegrationRow::as_returning())
        .get_result::<IntegrationRow>(tx)
        .map_err(|err| map_insert_error(err, integration))?;
    row_to_integration(row, Scope::Administration)
}

fn insert_project_record(
    tx: &mut PgConnection,
    project: ProjectId,
    integration: &NewIntegration,
) -> IntegrationStoreResult<Integration> {
    let new_row = NewProjectIntegrationRow {
        project_id: project.into_inner(),
        uid: integration.uid.as_str().to_owned(),
        name: integration.name.as_str().to_owned(),
        section: integration.section.as_str().to_owned(),
        settings: integration.settings.to_json(),
        config: integration.config.to_json(),
        status: integration.status.clone(),
        task_id: integration.task_id.clone(),
        is_default: false,
        created_at: integration.created_at,
        updated_at: integration.created_at,
    };
    let row = diesel::insert_into(project_integrations::table)
        .values(&new_row)
        .returning(ProjectIntegrationRow::as_returning())
        .get_result::<ProjectIntegrationRow>(tx)
        .map_err(|err| map_insert_error(err, integration))?;
    let record = project_row_to_integration(row)?;

    lock_default_slot(tx, Scope::Tenant(project), &integration.name)?;
    let shared_exists = integrations::table
        .filter(integrations::name.eq(integration.name.as_str()))
        .select(integrations::config)
        .load::<Value>(tx)?
        .into_iter()
        .any(|config| IntegrationConfig::new(config).is_ok_and(|c| c.is_shared()));
    let pointer_count: i64 = integration_defaults::table
        .filter(integration_defaults::project_id.eq(project.into_inner()))
        .filter(integration_defaults::name.eq(integration.name.as_str()))
        .filter(integration_defaults::is_default.eq(true))
        .count()
        .get_result(tx)?;

    if !shared_exists && pointer_count == 0 {
        upsert_pointer(tx, project, &record)?;
    }
    Ok(record)
}

fn upsert_pointer(
    tx: &mut PgConnection,
    tenant: ProjectId,
    record: &Integration,
) -> IntegrationStoreResult<DefaultPointer> {
    lock_default_slot(tx, Scope::Tenant(tenant), record.name())?;
    let target = record.reference();
    let target_project_id = target.owner.tenant().map(ProjectId::into_inner);
    let existing = integration_defaults::table
        .filter(integration_defaults::project_id.eq(tenant.into_inner()))
        .filter(integration_defaults::name.eq(record.name().as_str()))
        .filter(integration_defaults::is_default.eq(true))
        .select(integration_defaults::id)
        .first::<i64>(tx)
        .optional()?;

    let row = match existing {
        Some(pointer_id) => diesel::update(
            integration_defaults::table.filter(integration_defaults::id.eq(pointer_id)),
        )
        .set((
            integration_defaults::integration_id.eq(target.id.into_inner()),
            integration_defaults::target_project_id.eq(target_project_id),
            integration_defaults::section.eq(record.section().as_str()),
        ))
        .returning(DefaultPointerRow::as_returning())
        .get_result::<DefaultPointerRow>(tx),
        None => diesel::insert_into(integration_defaults::table)
            .values(&NewDefaultPointerRow {
                project_id: tenant.into_inner(),
                name: record.name().as_str().to_owned(),
                integration_id: target.id.into_inner(),
                target_project_id,
                section: record.section().as_str().to_owned(),
                is_default: true,
            })
            .returning(DefaultPointerRow::as_returning())
            .get_result::<DefaultPointerRow>(tx),
    }
    .map_err(|err| map_pointer_error(err, tenant, record.name()))?;
    row_to_pointer(row)
}

fn load_record(
    connection: &mut PgConnection,
    target: IntegrationRef,
) -> IntegrationStoreResult<Option<Integration>> {
    let id = target.id.into_inner();
    match target.owner {
        Scope::Administration => integrations::table
            .filter(integrations::id.eq(id))
            .select(IntegrationRow::as_select())
            .first::<IntegrationRow>(connection)
            .optional()?
            .map(|row| row_to_integration(row, Scope::Administration))
            .transpose(),
        Scope::Tenant(project) => project_integrations::table
            .filter(project_integrations::project_id.eq(project.into_inner()))
            .filter(project_integrations::id.eq(id))
            .select(ProjectIntegrationRow::as_select())
            .first::<ProjectIntegrationRow>(connection)
            .optional()?
            .map(project_row_to_integration)
            .transpose(),
    }
}

fn list_admin_records(
    connection: &mut PgConnection,
    filter: &RecordFilter,
) -> IntegrationStoreResult<Vec<Integration>> {
    let mut query = integrations::table
        .select(IntegrationRow::as_select())
        .order(integrations::id.asc())
        .into_boxed();
    if let Some(name) = &filter.name {
        query = query.filter(integrations::name.eq(name.as_str().to_owned()));
    }
    if let Some(section) = &filter.section {
        query = query.filter(integrations::section.eq(section.as_str().to_owned()));
    }
    query
        .load::<IntegrationRow>(connection)?
        .into_iter()
        .map(|row| row_to_integration(row, Scope::Administration))
        .collect()
}

fn list_project_records(
    connection: &mut PgConnection,
    project: ProjectId,
    filter: &RecordFilter,
) -> IntegrationStoreResult<Vec<Integration>> {
    let mut query = project_integrations::table
        .filter(project_integrations::project_id.eq(project.into_inner()))
        .select(ProjectIntegrationRow::as_select())
        .order(project_integrations::id.asc())
        .into_boxed();
    if let Some(name) = &filter.name {
        query = query.filter(project_integrations::name.eq(name.as_str().to_owned()));
    }
    if let Some(section) = &filter.section {
        query = query.filter(project_integrations::section.eq(section.as_str().to_owned()));
    }
    query
        .load::<ProjectIntegrationRow>(connection)?
        .into_iter()
        .map(project_row_to_integration)
        .collect()
}

fn map_insert_error(err: DieselError, integration: &NewIntegration) -> IntegrationStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info) => {
            match info.constraint_name() {
                Some(
                    UID_LEDGER_CONSTRAINT | ADMIN_UID_CONSTRAINT | PROJECT_UID_CONSTRAINT,
                ) => IntegrationStoreError::DuplicateUid(integration.uid.clone()),
                Some(ADMIN_DEFAULT_CONSTRAINT | PROJECT_DEFAULT_CONSTRAINT) => {
                    IntegrationStoreError::DuplicateDefault {
                        scope: integration.scope,
                        name: integration.name.clone(),
                    }
                }
                _ => IntegrationStoreError::persistence(err),
            }
        }
        _ => IntegrationStoreError::persistence(err),
    }
}

fn map_pointer_error(
    err: DieselError,
    tenant: ProjectId,
    name: &IntegrationName,
) -> IntegrationStoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if info.constraint_name() == Some(PROJECT_DEFAULT_CONSTRAINT) =>
        {
            IntegrationStoreError::DuplicateDefault {
                scope: Scope::Tenant(tenant),
                name: name.clone(),
            }
        }
        _ => IntegrationStoreError::persistence(err),
    }
}

fn project_row_to_integration(
    row: ProjectIntegrationRow,
) -> IntegrationStoreResult<Integration> {
    let ProjectIntegrationRow {
        id,
        project_id,
        uid,
        name,
        section,
        settings,
        config,
        status,
        task_id,
        is_default,
        created_at,
        updated_at,
    } = row;
    let admin_shaped = IntegrationRow {
        id,
        uid,
        name,
        section,
        settings,
        config,
        status,
        task_id,
        is_default,
        created_at,
        updated_at,
    };
    row_to_integration(admin_shaped, Scope::Tenant(ProjectId::new(project_id)))
}

fn row_to_integration(
    row: IntegrationRow,
    scope: Scope,
) -> IntegrationStoreResult<Integration> {
    let IntegrationRow {
        id,
        uid,
        name,
        section,
        settings,
        config,
        status,
        task_id,
        is_default,
        created_at,
        updated_at,
    } = row;

    let data = PersistedIntegrationData {
        id: IntegrationId::new(id),
        uid: IntegrationUid::new(uid).map_err(IntegrationStoreError::invalid_persisted_data)?,
        name: IntegrationName::new(name).map_err(IntegrationStoreError::invalid_persisted_data)?,
        scope,
        section: SectionName::new(section)
            .map_err(IntegrationStoreError::invalid_persisted_data)?,
        settings: IntegrationSettings::new(settings)
            .map_err(IntegrationStoreError::invalid_persisted_data)?,
        config: IntegrationConfig::new(config)
            .map_err(IntegrationStoreError::invalid_persisted_data)?,
        status,
        task_id,
        is_default,
        created_at,
        updated_at,
    };
    Ok(Integration::from_persisted(data))
}

fn row_to_pointer(row: DefaultPointerRow) -> IntegrationStoreResult<DefaultPointer> {
    let DefaultPointerRow {
        id,
        project_id,
        name,
        integration_id,
        target_project_id,
        section,
        ..
    } = row;

    let target_id = IntegrationId::new(integration_id);
    let target = target_project_id.map_or_else(
        || IntegrationRef::administration(target_id),
        |owner| IntegrationRef::project(ProjectId::new(owner), target_id),
    );
    Ok(DefaultPointer {
        id: PointerId::new(id),
        tenant: ProjectId::new(project_id),
        name: IntegrationName::new(name).map_err(IntegrationStoreError::invalid_persisted_data)?,
        target,
        section: SectionName::new(section)
            .map_err(IntegrationStoreError::invalid_persisted_data)?,
    })
}
