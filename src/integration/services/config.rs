//! Tunables for the resolution engine and the mutation orchestrator.

use crate::integration::domain::DEFAULT_STATUS;
use serde::Deserialize;

/// Resolution engine configuration.
///
/// # Examples
///
/// ```
/// use integration_registry::integration::services::ResolverConfig;
///
/// let config = ResolverConfig::default();
/// assert_eq!(config.capability_section, "ai");
/// assert_eq!(config.pointer_separator, "___");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Section whose entries carry a `models` list subject to default-model
    /// selection.
    pub capability_section: String,
    /// Secret key holding the `<integrationId><separator><modelId>` pointer.
    pub default_model_secret: String,
    /// Separator between the integration id and the model id.
    pub pointer_separator: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            capability_section: "ai".to_owned(),
            default_model_secret: "default_model".to_owned(),
            pointer_separator: "___".to_owned(),
        }
    }
}

impl ResolverConfig {
    /// Returns the default configuration with a different capability
    /// section.
    #[must_use]
    pub fn with_capability_section(section: impl Into<String>) -> Self {
        Self {
            capability_section: section.into(),
            ..Self::default()
        }
    }
}

/// Mutation orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Event fired after settings of an existing record change.
    pub settings_changed_event: String,
    /// Status given to records created without one.
    pub default_status: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            settings_changed_event: "integration_settings_changed".to_owned(),
            default_status: DEFAULT_STATUS.to_owned(),
        }
    }
}
