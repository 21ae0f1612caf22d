//! Identifier types for the integration domain.

use super::{IntegrationDomainError, Scope};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Maximum length for an integration uid, matching the `VARCHAR(128)` column.
const MAX_UID_LENGTH: usize = 128;

/// Tenant ("project") identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(i64);

impl ProjectId {
    /// Wraps a raw tenant identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw tenant identifier.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned integration identifier.
///
/// Only unique within its owning table: the administration table, or one
/// tenant's project table. Use [`IntegrationRef`] to address a record
/// unambiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrationId(i64);

impl IntegrationId {
    /// Wraps a raw store identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw store identifier.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl fmt::Display for IntegrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned default pointer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(i64);

impl PointerId {
    /// Wraps a raw pointer identifier.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw pointer identifier.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

/// Globally unique, store-independent integration identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrationUid(String);

impl IntegrationUid {
    /// Generates a fresh random uid.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a uid from a caller-supplied value.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationDomainError::EmptyUid`] when the value is blank
    /// or [`IntegrationDomainError::UidTooLong`] when it exceeds 128
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, IntegrationDomainError> {
        let trimmed = value.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(IntegrationDomainError::EmptyUid);
        }
        if trimmed.len() > MAX_UID_LENGTH {
            return Err(IntegrationDomainError::UidTooLong(trimmed));
        }
        Ok(Self(trimmed))
    }

    /// Returns the uid as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for IntegrationUid {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for IntegrationUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unambiguous address of an integration record: owning scope plus id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntegrationRef {
    /// Scope whose table holds the record.
    pub owner: Scope,
    /// Store-assigned identifier within that table.
    pub id: IntegrationId,
}

impl IntegrationRef {
    /// Creates a reference to a record.
    #[must_use]
    pub const fn new(owner: Scope, id: IntegrationId) -> Self {
        Self { owner, id }
    }

    /// References an administration record.
    #[must_use]
    pub const fn administration(id: IntegrationId) -> Self {
        Self::new(Scope::Administration, id)
    }

    /// References a project record owned by `project`.
    #[must_use]
    pub const fn project(project: ProjectId, id: IntegrationId) -> Self {
        Self::new(Scope::Tenant(project), id)
    }
}

impl fmt::Display for IntegrationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.id)
    }
}
