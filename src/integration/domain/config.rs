//! Typed envelope over the presentation/config object of an integration.

use super::{IntegrationDomainError, IntegrationId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const IS_SHARED_KEY: &str = "is_shared";
const NAME_KEY: &str = "name";

/// Config object of an integration record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrationConfig(Map<String, Value>);

impl IntegrationConfig {
    /// Wraps a JSON value. `null` is treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationDomainError::ConfigNotObject`] when the value is
    /// neither an object nor `null`.
    pub fn new(value: Value) -> Result<Self, IntegrationDomainError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::default()),
            _ => Err(IntegrationDomainError::ConfigNotObject),
        }
    }

    /// Returns `true` when `is_shared` is the boolean `true`.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.0
            .get(IS_SHARED_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns the display name, if one is set.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.0.get(NAME_KEY).and_then(Value::as_str)
    }

    /// Sets `name` to `Integration #<id>` unless a non-empty name exists.
    pub fn ensure_display_name(&mut self, id: IntegrationId) {
        let missing = self.display_name().is_none_or(str::is_empty);
        if missing {
            self.0
                .insert(NAME_KEY.to_owned(), Value::String(format!("Integration #{id}")));
        }
    }

    /// Returns a JSON copy of the config.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}
