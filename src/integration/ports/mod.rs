//! Port contracts for integration persistence, secrets, events and tenant
//! enumeration.
//!
//! Ports define infrastructure-agnostic interfaces used by the integration
//! services.

pub mod directory;
pub mod notifier;
pub mod schema;
pub mod secrets;
pub mod store;

pub use directory::{TenantDirectory, TenantDirectoryError, TenantDirectoryResult};
pub use notifier::{EventNotifier, NotifierError, NotifierResult};
pub use schema::SettingsSchema;
pub use secrets::{SecretAdapter, SecretAdapterError, SecretAdapterResult};
pub use store::{IntegrationStore, IntegrationStoreError, IntegrationStoreResult, RecordFilter};
