//! Field-level settings validation failures.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single schema violation tagged with the JSON pointer of the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// JSON pointer to the offending value (empty for the root).
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldViolation {
    /// Creates a violation.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Non-empty collection of violations returned by a settings schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    /// Wraps the violations reported by a schema.
    #[must_use]
    pub const fn new(violations: Vec<FieldViolation>) -> Self {
        Self(violations)
    }

    /// Returns the violations.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Returns the paths of every violation.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.0.iter().map(|v| v.path.as_str()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}
