//! Opaque settings schema handle.

use crate::integration::domain::ValidationErrors;
use serde_json::Value;
use std::fmt;

/// Validates and normalizes a settings payload for one integration type.
///
/// Implementations are supplied by whoever registers the type; the registry
/// never looks inside a schema.
pub trait SettingsSchema: fmt::Debug + Send + Sync {
    /// Returns the normalized payload, or every field violation found.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] when the payload does not conform.
    fn validate(&self, payload: &Value) -> Result<Value, ValidationErrors>;
}
