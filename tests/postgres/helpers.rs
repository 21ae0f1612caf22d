//! Shared helpers for `PostgreSQL` store tests.

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use integration_registry::integration::{
    adapters::postgres::PostgresIntegrationStore,
    domain::{
        IntegrationConfig, IntegrationName, IntegrationUid, NewIntegration, ProjectId, Scope,
        SectionName,
    },
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use serde_json::json;
use tokio::runtime::Runtime;

/// Boxed error used by setup helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// SQL creating the integration tables.
const CREATE_TABLES_SQL: &str =
    include_str!("../../migrations/2026-10-01-000000_create_integration_tables/up.sql");

/// Template database name for the pre-migrated schema.
const TEMPLATE_DB: &str = "integration_registry_test_template";

/// Tenant used by most tests.
pub const TENANT: ProjectId = ProjectId::new(100);

/// Second tenant for isolation checks.
pub const NEIGHBOUR: ProjectId = ProjectId::new(200);

/// Creates a tokio runtime for async operations in tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            execute_sql_statements(&mut conn, CREATE_TABLES_SQL)?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Executes the semicolon-separated statements of a migration one by one.
fn execute_sql_statements(conn: &mut PgConnection, sql: &str) -> eyre::Result<()> {
    for statement in sql.split(';') {
        let trimmed = statement.trim();
        if trimmed.is_empty() || trimmed.lines().all(|line| line.trim().starts_with("--")) {
            continue;
        }
        diesel::sql_query(trimmed)
            .execute(conn)
            .map_err(|e| eyre::eyre!("SQL error: {e}\nStatement: {trimmed}"))?;
    }
    Ok(())
}

/// Creates a test database from the template and returns a store over it.
///
/// Races need `pool_size > 1`; every other test uses a single connection.
pub fn setup_store(
    cluster: &TestCluster,
    db_name: &str,
    pool_size: u32,
) -> Result<PostgresIntegrationStore, BoxError> {
    cluster
        .create_database_from_template(db_name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    let url = cluster.connection().database_url(db_name);
    let manager = ConnectionManager::<PgConnection>::new(url);
    let pool = Pool::builder()
        .max_size(pool_size)
        .build(manager)
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(PostgresIntegrationStore::new(pool))
}

/// Builds a unique database name for one test.
pub fn database_name(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::new_v4().simple())
}

/// Builds an insert request for `name` in `section`.
pub fn new_record(name: &str, section: &str, scope: Scope) -> NewIntegration {
    NewIntegration::new(
        IntegrationUid::generate(),
        IntegrationName::new(name).expect("valid integration name"),
        scope,
        SectionName::new(section).expect("valid section name"),
        &DefaultClock,
    )
}

/// Builds an administration insert request shared with every tenant.
pub fn shared_record(name: &str, section: &str) -> NewIntegration {
    let config = IntegrationConfig::new(json!({ "is_shared": true })).expect("object config");
    new_record(name, section, Scope::Administration).with_config(config)
}

/// Guard that drops the test database even when the test panics.
///
/// Declare it before the store so the pool closes its connections first.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl<'a> CleanupGuard<'a> {
    /// Registers `db_name` for removal.
    pub const fn new(cluster: &'a TestCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}
