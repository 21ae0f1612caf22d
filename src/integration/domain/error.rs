//! Error types for integration domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing integration domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntegrationDomainError {
    /// The integration type name is empty after trimming.
    #[error("integration name must not be empty")]
    EmptyIntegrationName,

    /// The integration type name contains characters outside `[a-z0-9_-]`.
    #[error(
        "integration name '{0}' contains invalid characters (only lowercase alphanumeric, underscores and hyphens allowed)"
    )]
    InvalidIntegrationName(String),

    /// The integration type name exceeds the 64-character storage limit.
    #[error("integration name exceeds 64 character limit: {0}")]
    IntegrationNameTooLong(String),

    /// The section name is empty after trimming.
    #[error("section name must not be empty")]
    EmptySectionName,

    /// The section name contains characters outside `[a-z0-9_-]`.
    #[error(
        "section name '{0}' contains invalid characters (only lowercase alphanumeric, underscores and hyphens allowed)"
    )]
    InvalidSectionName(String),

    /// The section name exceeds the 64-character storage limit.
    #[error("section name exceeds 64 character limit: {0}")]
    SectionNameTooLong(String),

    /// The integration uid is empty after trimming.
    #[error("integration uid must not be empty")]
    EmptyUid,

    /// The integration uid exceeds the 128-character storage limit.
    #[error("integration uid exceeds 128 character limit: {0}")]
    UidTooLong(String),

    /// Settings must be a JSON object.
    #[error("integration settings must be a JSON object")]
    SettingsNotObject,

    /// Config must be a JSON object.
    #[error("integration config must be a JSON object")]
    ConfigNotObject,
}
