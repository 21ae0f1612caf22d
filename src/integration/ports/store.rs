//! Record store port for integration records and default pointers.

use crate::integration::domain::{
    DefaultPointer, Integration, IntegrationId, IntegrationName, IntegrationRef, IntegrationUid,
    NewIntegration, ProjectId, Scope, SectionName,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for integration store operations.
pub type IntegrationStoreResult<T> = Result<T, IntegrationStoreError>;

/// Row filter applied by [`IntegrationStore::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    /// Restrict to one type name.
    pub name: Option<IntegrationName>,
    /// Restrict to one section.
    pub section: Option<SectionName>,
    /// Restrict to administration records with `config.is_shared == true`.
    pub shared_only: bool,
}

impl RecordFilter {
    /// Matches every record.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches records of one type.
    #[must_use]
    pub fn by_name(name: IntegrationName) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    /// Matches records of one section.
    #[must_use]
    pub fn by_section(section: SectionName) -> Self {
        Self {
            section: Some(section),
            ..Self::default()
        }
    }

    /// Restricts the filter to shared records.
    #[must_use]
    pub const fn shared(mut self) -> Self {
        self.shared_only = true;
        self
    }

    /// Returns `true` when the record passes every criterion.
    #[must_use]
    pub fn matches(&self, integration: &Integration) -> bool {
        self.name.as_ref().is_none_or(|n| integration.name() == n)
            && self
                .section
                .as_ref()
                .is_none_or(|s| integration.section() == s)
            && (!self.shared_only || integration.is_shared())
    }
}

/// Persistence contract for administration records, project records and
/// per-tenant default pointers.
///
/// Every method is one atomic unit.
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    /// Inserts a record and assigns its store id.
    ///
    /// First-of-kind defaulting happens in the same unit: an administration
    /// record is flagged default when no administration default exists for
    /// its name; a tenant record receives a pointer when the tenant has no
    /// pointer for the name and no shared administration record of that name
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationStoreError::DuplicateUid`] when the uid was ever
    /// issued before.
    async fn insert(&self, integration: NewIntegration) -> IntegrationStoreResult<Integration>;

    /// Persists settings, config, status, task id and `updated_at` of an
    /// existing record.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationStoreError::NotFound`] when the record does not
    /// exist.
    async fn update(&self, integration: &Integration) -> IntegrationStoreResult<()>;

    /// Persists the record like [`IntegrationStore::update`] and makes it the
    /// default of its name within its owner scope, in the same unit.
    ///
    /// An administration record takes the default flag from every other
    /// record of its name; a tenant record becomes the target of its tenant's
    /// pointer. Returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationStoreError::NotFound`] when the record does not
    /// exist. Nothing is written when any step fails.
    async fn update_and_promote(
        &self,
        integration: &Integration,
    ) -> IntegrationStoreResult<Integration>;

    /// Deletes a record together with every pointer targeting it, in every
    /// tenant.
    ///
    /// Returns the deleted record, or `None` when it did not exist.
    async fn delete(&self, target: IntegrationRef) -> IntegrationStoreResult<Option<Integration>>;

    /// Finds a record by owner and id.
    async fn find_by_id(&self, target: IntegrationRef)
    -> IntegrationStoreResult<Option<Integration>>;

    /// Finds a record by uid within one owner's table.
    async fn find_by_uid(
        &self,
        uid: &IntegrationUid,
        owner: Scope,
    ) -> IntegrationStoreResult<Option<Integration>>;

    /// Lists the records of one owner's table matching `filter`.
    async fn list(
        &self,
        owner: Scope,
        filter: &RecordFilter,
    ) -> IntegrationStoreResult<Vec<Integration>>;

    /// Lists every default pointer held by a tenant.
    async fn pointers(&self, tenant: ProjectId) -> IntegrationStoreResult<Vec<DefaultPointer>>;

    /// Upserts the tenant's single pointer for the target's name so that it
    /// selects `target`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationStoreError::NotFound`] when the target does not
    /// exist.
    async fn set_pointer(
        &self,
        tenant: ProjectId,
        target: IntegrationRef,
    ) -> IntegrationStoreResult<DefaultPointer>;

    /// Clears the administration default flag on every other record of the
    /// same name and sets it on `id`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationStoreError::NotFound`] when the record does not
    /// exist.
    async fn promote_admin_default(&self, id: IntegrationId)
    -> IntegrationStoreResult<Integration>;
}

/// Errors returned by integration store implementations.
#[derive(Debug, Clone, Error)]
pub enum IntegrationStoreError {
    /// The record was not found.
    #[error("integration not found: {0}")]
    NotFound(IntegrationRef),

    /// The uid has already been issued to another record.
    #[error("duplicate integration uid: {0}")]
    DuplicateUid(IntegrationUid),

    /// A second default would exist for the same name.
    #[error("duplicate default for integration {name} in {scope}")]
    DuplicateDefault {
        /// Scope holding the conflicting default.
        scope: Scope,
        /// Type name.
        name: IntegrationName,
    },

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IntegrationStoreError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
