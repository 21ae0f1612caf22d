//! Validated integration type and section names.

use super::IntegrationDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a type or section name, matching `VARCHAR(64)`.
const MAX_NAME_LENGTH: usize = 64;

fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

fn has_valid_characters(normalized: &str) -> bool {
    normalized
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// Lower-cased integration type name (e.g. `aws`, `open_ai`).
///
/// The name is the key of a type in the catalog and of every record and
/// default pointer created for that type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IntegrationName(String);

impl IntegrationName {
    /// Creates a validated integration name.
    ///
    /// The input is trimmed and lowercased. Only characters in `[a-z0-9_-]`
    /// are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationDomainError::EmptyIntegrationName`],
    /// [`IntegrationDomainError::IntegrationNameTooLong`] or
    /// [`IntegrationDomainError::InvalidIntegrationName`] when validation
    /// fails.
    pub fn new(value: impl Into<String>) -> Result<Self, IntegrationDomainError> {
        let raw = value.into();
        let normalized = normalize(&raw);

        if normalized.is_empty() {
            return Err(IntegrationDomainError::EmptyIntegrationName);
        }
        if normalized.len() > MAX_NAME_LENGTH {
            return Err(IntegrationDomainError::IntegrationNameTooLong(raw));
        }
        if !has_valid_characters(&normalized) {
            return Err(IntegrationDomainError::InvalidIntegrationName(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IntegrationName {
    type Error = IntegrationDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<IntegrationName> for String {
    fn from(value: IntegrationName) -> Self {
        value.0
    }
}

impl AsRef<str> for IntegrationName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for IntegrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lower-cased section name grouping integration types (e.g. `clouds`, `ai`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionName(String);

impl SectionName {
    /// Creates a validated section name.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationDomainError::EmptySectionName`],
    /// [`IntegrationDomainError::SectionNameTooLong`] or
    /// [`IntegrationDomainError::InvalidSectionName`] when validation fails.
    pub fn new(value: impl Into<String>) -> Result<Self, IntegrationDomainError> {
        let raw = value.into();
        let normalized = normalize(&raw);

        if normalized.is_empty() {
            return Err(IntegrationDomainError::EmptySectionName);
        }
        if normalized.len() > MAX_NAME_LENGTH {
            return Err(IntegrationDomainError::SectionNameTooLong(raw));
        }
        if !has_valid_characters(&normalized) {
            return Err(IntegrationDomainError::InvalidSectionName(raw));
        }

        Ok(Self(normalized))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SectionName {
    type Error = IntegrationDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SectionName> for String {
    fn from(value: SectionName) -> Self {
        value.0
    }
}

impl AsRef<str> for SectionName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
