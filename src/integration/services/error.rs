//! Service-level errors shared by the resolver and the orchestrator.

use crate::integration::{
    domain::{Integration, IntegrationDomainError, IntegrationRef, ValidationErrors},
    ports::{IntegrationStoreError, NotifierError, SecretAdapterError, TenantDirectoryError},
};
use thiserror::Error;

use super::CatalogError;

/// Result type for integration service operations.
pub type IntegrationServiceResult<T> = Result<T, IntegrationServiceError>;

/// Errors returned by integration services.
#[derive(Debug, Error)]
pub enum IntegrationServiceError {
    /// Input could not be turned into domain values.
    #[error(transparent)]
    Domain(#[from] IntegrationDomainError),

    /// Catalog registration input was rejected.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The integration type is not in the catalog.
    #[error("integration type '{0}' is not registered")]
    UnknownType(String),

    /// The record does not exist or its type is not registered.
    #[error("integration not found: {0}")]
    NotFound(IntegrationRef),

    /// The settings payload failed schema validation.
    #[error("settings validation failed: {0}")]
    Validation(ValidationErrors),

    /// A uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(IntegrationStoreError),

    /// Record store failure.
    #[error(transparent)]
    Store(IntegrationStoreError),

    /// Secret vault failure.
    #[error(transparent)]
    Secrets(#[from] SecretAdapterError),

    /// Tenant directory failure.
    #[error(transparent)]
    Directory(#[from] TenantDirectoryError),

    /// The mutation was committed but its event could not be delivered.
    #[error("integration {} was saved but event delivery failed: {source}", .integration.reference())]
    NotificationFailed {
        /// The committed record.
        integration: Box<Integration>,
        /// Notifier error.
        source: NotifierError,
    },
}

impl From<IntegrationStoreError> for IntegrationServiceError {
    fn from(err: IntegrationStoreError) -> Self {
        match err {
            IntegrationStoreError::NotFound(target) => Self::NotFound(target),
            IntegrationStoreError::DuplicateUid(_)
            | IntegrationStoreError::DuplicateDefault { .. } => Self::Conflict(err),
            IntegrationStoreError::InvalidPersistedData(_)
            | IntegrationStoreError::Persistence(_) => Self::Store(err),
        }
    }
}

impl From<ValidationErrors> for IntegrationServiceError {
    fn from(err: ValidationErrors) -> Self {
        Self::Validation(err)
    }
}
