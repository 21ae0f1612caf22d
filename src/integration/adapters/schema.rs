//! JSON Schema backed settings validation.

use crate::integration::{
    domain::{FieldViolation, ValidationErrors},
    ports::SettingsSchema,
};
use jsonschema::Validator;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Error raised when a JSON Schema document cannot be compiled.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid settings schema: {0}")]
pub struct InvalidSettingsSchema(String);

/// [`SettingsSchema`] implementation that checks payloads against a
/// compiled JSON Schema document.
///
/// Valid payloads are returned unchanged.
pub struct JsonSchemaSettings {
    document: Value,
    validator: Validator,
}

impl JsonSchemaSettings {
    /// Compiles a JSON Schema document.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSettingsSchema`] when the document is not a valid
    /// schema.
    pub fn new(document: Value) -> Result<Self, InvalidSettingsSchema> {
        let validator = jsonschema::validator_for(&document)
            .map_err(|err| InvalidSettingsSchema(err.to_string()))?;
        Ok(Self {
            document,
            validator,
        })
    }
}

impl fmt::Debug for JsonSchemaSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaSettings")
            .field("document", &self.document)
            .finish_non_exhaustive()
    }
}

impl SettingsSchema for JsonSchemaSettings {
    fn validate(&self, payload: &Value) -> Result<Value, ValidationErrors> {
        let violations: Vec<FieldViolation> = self
            .validator
            .iter_errors(payload)
            .map(|err| FieldViolation::new(err.instance_path.to_string(), err.to_string()))
            .collect();
        if violations.is_empty() {
            Ok(payload.clone())
        } else {
            Err(ValidationErrors::new(violations))
        }
    }
}
