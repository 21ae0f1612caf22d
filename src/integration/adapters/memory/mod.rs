//! In-memory adapters for integration tests and local development.

mod directory;
mod notifier;
mod store;
mod vault;

pub use directory::StaticTenantDirectory;
pub use notifier::RecordingNotifier;
pub use store::InMemoryIntegrationStore;
pub use vault::{InMemorySecretVault, secret_reference};
