//! Tenant directory port.

use crate::integration::domain::ProjectId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for tenant directory operations.
pub type TenantDirectoryResult<T> = Result<T, TenantDirectoryError>;

/// Enumerates tenants for broadcasts and cross-tenant lookups.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    /// Lists every tenant.
    async fn list_projects(&self) -> TenantDirectoryResult<Vec<ProjectId>>;
}

/// Errors returned by tenant directories.
#[derive(Debug, Clone, Error)]
pub enum TenantDirectoryError {
    /// The directory could not be read.
    #[error("tenant directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TenantDirectoryError {
    /// Wraps a directory error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
