//! Secret vault port.

use crate::integration::domain::{Integration, IntegrationSettings, Scope};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for secret adapter operations.
pub type SecretAdapterResult<T> = Result<T, SecretAdapterError>;

/// Moves secret settings fields into a vault and back.
///
/// Vaults are partitioned by [`Scope`]: administration secrets and each
/// tenant's secrets are isolated from one another.
#[async_trait]
pub trait SecretAdapter: Send + Sync {
    /// Stores every plaintext secret field of a freshly inserted record and
    /// returns settings in which those fields hold vault references.
    async fn store(&self, integration: &Integration) -> SecretAdapterResult<IntegrationSettings>;

    /// Computes the settings to persist when `current` is updated with
    /// `incoming`.
    ///
    /// Secret fields that still hold the existing reference, that carry the
    /// same plaintext, or that are omitted from `incoming` keep the existing
    /// reference. Changed plaintext is stored under a new reference.
    async fn replace(
        &self,
        current: &Integration,
        incoming: IntegrationSettings,
    ) -> SecretAdapterResult<IntegrationSettings>;

    /// Returns a copy of `settings` whose secret references are replaced by
    /// their plaintext values read from the `scope` vault.
    async fn unsecret(
        &self,
        settings: &IntegrationSettings,
        scope: Scope,
    ) -> SecretAdapterResult<IntegrationSettings>;

    /// Reads a named secret from the `scope` vault.
    async fn get_secret(&self, key: &str, scope: Scope) -> SecretAdapterResult<Option<String>>;
}

/// Errors returned by secret adapters.
#[derive(Debug, Clone, Error)]
pub enum SecretAdapterError {
    /// A reference points at a secret the vault does not hold.
    #[error("unknown secret reference '{reference}' in {scope}")]
    UnknownReference {
        /// Vault partition that was searched.
        scope: Scope,
        /// The dangling reference.
        reference: String,
    },

    /// Vault access failed.
    #[error("secret vault error: {0}")]
    Vault(Arc<dyn std::error::Error + Send + Sync>),
}

impl SecretAdapterError {
    /// Wraps a vault error.
    pub fn vault(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Vault(Arc::new(err))
    }
}
