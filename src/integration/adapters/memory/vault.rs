//! In-memory secret vault partitioned by scope.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::integration::{
    domain::{Integration, IntegrationSettings, Scope, SecretField},
    ports::{SecretAdapter, SecretAdapterError, SecretAdapterResult},
};

const REFERENCE_PREFIX: &str = "{{secret.";
const REFERENCE_SUFFIX: &str = "}}";

/// Formats the settings reference for a vault key.
#[must_use]
pub fn secret_reference(key: &str) -> String {
    format!("{REFERENCE_PREFIX}{key}{REFERENCE_SUFFIX}")
}

fn reference_key(reference: &str) -> Option<&str> {
    reference
        .strip_prefix(REFERENCE_PREFIX)?
        .strip_suffix(REFERENCE_SUFFIX)
}

/// Thread-safe in-memory [`SecretAdapter`].
///
/// Secrets written for a record are keyed `<type>_<field>_<n>` where `n`
/// increases with every write, so a changed value never reuses a key.
#[derive(Debug, Clone, Default)]
pub struct InMemorySecretVault {
    state: Arc<RwLock<VaultState>>,
}

#[derive(Debug, Default)]
struct VaultState {
    partitions: HashMap<Scope, HashMap<String, String>>,
    writes: u64,
}

impl VaultState {
    fn write_secret(&mut self, scope: Scope, prefix: &str, value: &str) -> SecretField {
        self.writes += 1;
        let key = format!("{prefix}_{}", self.writes);
        self.partitions
            .entry(scope)
            .or_default()
            .insert(key.clone(), value.to_owned());
        SecretField::reference(secret_reference(&key))
    }

    fn resolve(&self, scope: Scope, reference: &str) -> Option<&String> {
        let key = reference_key(reference)?;
        self.partitions.get(&scope)?.get(key)
    }
}

impl InMemorySecretVault {
    /// Creates an empty vault.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a named secret directly, as an operator would.
    ///
    /// # Errors
    ///
    /// Returns [`SecretAdapterError::Vault`] when the vault lock is poisoned.
    pub fn put_secret(
        &self,
        scope: Scope,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> SecretAdapterResult<()> {
        let mut state = self.state.write().map_err(poisoned)?;
        state
            .partitions
            .entry(scope)
            .or_default()
            .insert(key.into(), value.into());
        Ok(())
    }

    /// Returns the number of secrets held for a scope.
    ///
    /// # Errors
    ///
    /// Returns [`SecretAdapterError::Vault`] when the vault lock is poisoned.
    pub fn secret_count(&self, scope: Scope) -> SecretAdapterResult<usize> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.partitions.get(&scope).map_or(0, HashMap::len))
    }
}

fn poisoned<E: std::fmt::Display>(err: E) -> SecretAdapterError {
    SecretAdapterError::vault(std::io::Error::other(err.to_string()))
}

fn key_prefix(integration: &Integration, field: &str) -> String {
    format!("{}_{field}", integration.name())
}

#[async_trait]
impl SecretAdapter for InMemorySecretVault {
    async fn store(&self, integration: &Integration) -> SecretAdapterResult<IntegrationSettings> {
        let mut state = self.state.write().map_err(poisoned)?;
        let mut settings = integration.settings().clone();
        for (field, secret) in integration.settings().secret_fields() {
            if secret.from_secrets {
                continue;
            }
            let stored = state.write_secret(
                integration.scope(),
                &key_prefix(integration, &field),
                &secret.value,
            );
            settings.set_secret_field(&field, &stored);
        }
        Ok(settings)
    }

    async fn replace(
        &self,
        current: &Integration,
        incoming: IntegrationSettings,
    ) -> SecretAdapterResult<IntegrationSettings> {
        let mut state = self.state.write().map_err(poisoned)?;
        let scope = current.scope();
        let mut settings = incoming;

        for (field, secret) in settings.secret_fields() {
            if secret.from_secrets {
                continue;
            }
            let existing = current
                .settings()
                .secret_field(&field)
                .filter(|old| old.from_secrets);
            let unchanged = existing
                .as_ref()
                .and_then(|old| state.resolve(scope, &old.value))
                .is_some_and(|stored| *stored == secret.value);
            let resolved = match existing {
                Some(old) if unchanged => old,
                _ => state.write_secret(scope, &key_prefix(current, &field), &secret.value),
            };
            settings.set_secret_field(&field, &resolved);
        }

        for (field, old) in current.settings().secret_fields() {
            if settings.get(&field).is_none() {
                settings.set_secret_field(&field, &old);
            }
        }
        Ok(settings)
    }

    async fn unsecret(
        &self,
        settings: &IntegrationSettings,
        scope: Scope,
    ) -> SecretAdapterResult<IntegrationSettings> {
        let state = self.state.read().map_err(poisoned)?;
        let mut revealed = settings.clone();
        for (field, secret) in settings.secret_fields() {
            if !secret.from_secrets {
                continue;
            }
            let plaintext = state.resolve(scope, &secret.value).ok_or_else(|| {
                SecretAdapterError::UnknownReference {
                    scope,
                    reference: secret.value.clone(),
                }
            })?;
            revealed.set_secret_field(&field, &SecretField::plaintext(plaintext.clone()));
        }
        Ok(revealed)
    }

    async fn get_secret(&self, key: &str, scope: Scope) -> SecretAdapterResult<Option<String>> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .partitions
            .get(&scope)
            .and_then(|partition| partition.get(key))
            .cloned())
    }
}
