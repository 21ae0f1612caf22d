//! Diesel row models for integration persistence.

use super::schema::{integration_defaults, integration_uids, integrations, project_integrations};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for administration records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = integrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct IntegrationRow {
    /// Store identifier.
    pub id: i64,
    /// Global uid.
    pub uid: String,
    /// Integration type name.
    pub name: String,
    /// Section name.
    pub section: String,
    /// Settings JSON payload.
    pub settings: Value,
    /// Config JSON payload.
    pub config: Value,
    /// Status string.
    pub status: String,
    /// Background task reference.
    pub task_id: Option<String>,
    /// Administration default flag.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for administration records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = integrations)]
pub struct NewIntegrationRow {
    /// Global uid.
    pub uid: String,
    /// Integration type name.
    pub name: String,
    /// Section name.
    pub section: String,
    /// Settings JSON payload.
    pub settings: Value,
    /// Config JSON payload.
    pub config: Value,
    /// Status string.
    pub status: String,
    /// Background task reference.
    pub task_id: Option<String>,
    /// Administration default flag.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for tenant records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = project_integrations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectIntegrationRow {
    /// Store identifier.
    pub id: i64,
    /// Owning tenant.
    pub project_id: i64,
    /// Global uid.
    pub uid: String,
    /// Integration type name.
    pub name: String,
    /// Section name.
    pub section: String,
    /// Settings JSON payload.
    pub settings: Value,
    /// Config JSON payload.
    pub config: Value,
    /// Status string.
    pub status: String,
    /// Background task reference.
    pub task_id: Option<String>,
    /// Unused default flag.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for tenant records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = project_integrations)]
pub struct NewProjectIntegrationRow {
    /// Owning tenant.
    pub project_id: i64,
    /// Global uid.
    pub uid: String,
    /// Integration type name.
    pub name: String,
    /// Section name.
    pub section: String,
    /// Settings JSON payload.
    pub settings: Value,
    /// Config JSON payload.
    pub config: Value,
    /// Status string.
    pub status: String,
    /// Background task reference.
    pub task_id: Option<String>,
    /// Unused default flag.
    pub is_default: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for default pointers.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = integration_defaults)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DefaultPointerRow {
    /// Pointer identifier.
    pub id: i64,
    /// Tenant holding the pointer.
    pub project_id: i64,
    /// Integration type name.
    pub name: String,
    /// Target record id.
    pub integration_id: i64,
    /// Owning tenant of the target, `None` for administration targets.
    pub target_project_id: Option<i64>,
    /// Section name.
    pub section: String,
    /// Active flag.
    pub is_default: bool,
}

/// Insert model for default pointers.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = integration_defaults)]
pub struct NewDefaultPointerRow {
    /// Tenant holding the pointer.
    pub project_id: i64,
    /// Integration type name.
    pub name: String,
    /// Target record id.
    pub integration_id: i64,
    /// Owning tenant of the target, `None` for administration targets.
    pub target_project_id: Option<i64>,
    /// Section name.
    pub section: String,
    /// Active flag.
    pub is_default: bool,
}

/// Insert model for the issued-uid ledger.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = integration_uids)]
pub struct IssuedUidRow {
    /// Issued uid.
    pub uid: String,
}
