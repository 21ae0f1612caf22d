//! Typed envelope over the opaque settings object of an integration.
//!
//! Settings are validated by per-type schemas the core never inspects. The
//! envelope exposes only the fields the core does touch: secret fields and
//! the `models` list used by the default-model policy.

use super::IntegrationDomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const MODELS_KEY: &str = "models";
const FROM_SECRETS_KEY: &str = "from_secrets";
const VALUE_KEY: &str = "value";

/// A settings value shaped `{"from_secrets": bool, "value": string}`.
///
/// With `from_secrets == true` the value is a vault reference; otherwise it
/// is plaintext waiting to be moved into the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretField {
    /// Whether `value` is a vault reference.
    pub from_secrets: bool,
    /// Vault reference or plaintext secret.
    pub value: String,
}

impl SecretField {
    /// Creates a field holding a vault reference.
    #[must_use]
    pub fn reference(value: impl Into<String>) -> Self {
        Self {
            from_secrets: true,
            value: value.into(),
        }
    }

    /// Creates a field holding plaintext.
    #[must_use]
    pub fn plaintext(value: impl Into<String>) -> Self {
        Self {
            from_secrets: false,
            value: value.into(),
        }
    }

    /// Reads a secret field from a JSON value, returning `None` for any
    /// other shape.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.len() != 2 {
            return None;
        }
        let from_secrets = object.get(FROM_SECRETS_KEY)?.as_bool()?;
        let secret = object.get(VALUE_KEY)?.as_str()?;
        Some(Self {
            from_secrets,
            value: secret.to_owned(),
        })
    }

    /// Renders the field as JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(FROM_SECRETS_KEY.to_owned(), Value::Bool(self.from_secrets));
        object.insert(VALUE_KEY.to_owned(), Value::String(self.value.clone()));
        Value::Object(object)
    }
}

/// Mutable view over one entry of the `models` settings list.
#[derive(Debug)]
pub struct ModelEntry<'a>(&'a mut Map<String, Value>);

impl ModelEntry<'_> {
    /// Returns the model identifier when present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Returns `true` when `capabilities.chat_completion` is `true`.
    #[must_use]
    pub fn supports_chat_completion(&self) -> bool {
        self.0
            .get("capabilities")
            .and_then(|caps| caps.get("chat_completion"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Sets the `default` flag.
    pub fn set_default(&mut self, is_default: bool) {
        self.0.insert("default".to_owned(), Value::Bool(is_default));
    }
}

/// Settings object of an integration record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegrationSettings(Map<String, Value>);

impl IntegrationSettings {
    /// Wraps a JSON value.
    ///
    /// `null` is treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrationDomainError::SettingsNotObject`] when the value
    /// is neither an object nor `null`.
    pub fn new(value: Value) -> Result<Self, IntegrationDomainError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            Value::Null => Ok(Self::empty()),
            _ => Err(IntegrationDomainError::SettingsNotObject),
        }
    }

    /// Creates empty settings.
    #[must_use]
    pub fn empty() -> Self {
        Self(Map::new())
    }

    /// Returns `true` when no keys are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Looks up a top-level settings value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a JSON copy of the settings.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Returns every top-level secret field with its key.
    #[must_use]
    pub fn secret_fields(&self) -> Vec<(String, SecretField)> {
        self.0
            .iter()
            .filter_map(|(key, value)| SecretField::from_json(value).map(|f| (key.clone(), f)))
            .collect()
    }

    /// Returns the secret field stored under `key`.
    #[must_use]
    pub fn secret_field(&self, key: &str) -> Option<SecretField> {
        self.0.get(key).and_then(SecretField::from_json)
    }

    /// Writes a secret field under `key`, replacing any previous value.
    pub fn set_secret_field(&mut self, key: &str, field: &SecretField) {
        self.0.insert(key.to_owned(), field.to_json());
    }

    /// Iterates mutable views of the object entries in `models`.
    ///
    /// Non-object entries are skipped.
    pub fn models_mut(&mut self) -> impl Iterator<Item = ModelEntry<'_>> {
        self.0
            .get_mut(MODELS_KEY)
            .and_then(Value::as_array_mut)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object_mut)
            .map(ModelEntry)
    }

    /// Returns the identifier of the model flagged `default`, if any.
    #[must_use]
    pub fn default_model_id(&self) -> Option<&str> {
        self.0
            .get(MODELS_KEY)
            .and_then(Value::as_array)?
            .iter()
            .find(|model| model.get("default").and_then(Value::as_bool) == Some(true))
            .and_then(|model| model.get("id"))
            .and_then(Value::as_str)
    }
}

impl From<IntegrationSettings> for Value {
    fn from(value: IntegrationSettings) -> Self {
        Self::Object(value.0)
    }
}
