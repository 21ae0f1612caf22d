//! Shared fixtures wiring services to in-memory adapters.

use std::sync::Arc;

use crate::integration::{
    adapters::{
        memory::{
            InMemoryIntegrationStore, InMemorySecretVault, RecordingNotifier,
            StaticTenantDirectory,
        },
        schema::JsonSchemaSettings,
    },
    domain::{Integration, ProjectId, Scope},
    ports::SettingsSchema,
    services::{
        IntegrationCatalog, IntegrationOrchestrator, IntegrationPayload, IntegrationResolver,
        IntegrationServiceResult, RegisterTypeRequest,
    },
};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::{Value, json};

pub type TestResolver =
    IntegrationResolver<InMemoryIntegrationStore, InMemorySecretVault, StaticTenantDirectory>;

pub type TestOrchestrator = IntegrationOrchestrator<
    InMemoryIntegrationStore,
    InMemorySecretVault,
    RecordingNotifier,
    StaticTenantDirectory,
    DefaultClock,
>;

pub const TENANT: ProjectId = ProjectId::new(7);
pub const OTHER_TENANT: ProjectId = ProjectId::new(8);

pub fn open_schema() -> Arc<dyn SettingsSchema> {
    Arc::new(JsonSchemaSettings::new(json!({ "type": "object" })).expect("valid schema"))
}

pub fn region_schema() -> Arc<dyn SettingsSchema> {
    Arc::new(
        JsonSchemaSettings::new(json!({
            "type": "object",
            "required": ["region"],
            "properties": { "region": { "type": "string" } }
        }))
        .expect("valid schema"),
    )
}

/// Catalog with `aws` and `gcp` in `clouds`, `openai` and `anthropic` in
/// `ai`, and `slack` in `notifications`.
pub fn standard_catalog() -> Arc<IntegrationCatalog> {
    let catalog = IntegrationCatalog::new();
    for (name, section) in [
        ("gcp", "clouds"),
        ("openai", "ai"),
        ("anthropic", "ai"),
        ("slack", "notifications"),
    ] {
        catalog
            .register(RegisterTypeRequest::new(name, section, open_schema()))
            .expect("register type");
    }
    catalog
        .register(RegisterTypeRequest::new("aws", "clouds", region_schema()))
        .expect("register aws");
    Arc::new(catalog)
}

pub struct Harness {
    pub catalog: Arc<IntegrationCatalog>,
    pub store: Arc<InMemoryIntegrationStore>,
    pub vault: Arc<InMemorySecretVault>,
    pub notifier: Arc<RecordingNotifier>,
    pub directory: Arc<StaticTenantDirectory>,
    pub resolver: TestResolver,
    pub orchestrator: TestOrchestrator,
}

impl Harness {
    pub fn with_catalog(catalog: Arc<IntegrationCatalog>) -> Self {
        let store = Arc::new(InMemoryIntegrationStore::new());
        let vault = Arc::new(InMemorySecretVault::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let directory = Arc::new(StaticTenantDirectory::new([TENANT, OTHER_TENANT]));
        let resolver = IntegrationResolver::new(
            Arc::clone(&catalog),
            Arc::clone(&store),
            Arc::clone(&vault),
            Arc::clone(&directory),
        );
        let orchestrator = IntegrationOrchestrator::new(
            Arc::clone(&catalog),
            Arc::clone(&store),
            Arc::clone(&vault),
            Arc::clone(&notifier),
            Arc::clone(&directory),
            Arc::new(DefaultClock),
        );
        Self {
            catalog,
            store,
            vault,
            notifier,
            directory,
            resolver,
            orchestrator,
        }
    }

    pub async fn create(
        &self,
        name: &str,
        scope: Scope,
        settings: Value,
    ) -> IntegrationServiceResult<Integration> {
        self.orchestrator
            .create(name, scope, IntegrationPayload::new(settings))
            .await
    }

    pub async fn create_shared(&self, name: &str, settings: Value) -> IntegrationServiceResult<Integration> {
        let payload = IntegrationPayload::new(settings).with_config(json!({ "is_shared": true }));
        self.orchestrator
            .create(name, Scope::Administration, payload)
            .await
    }
}

#[fixture]
pub fn harness() -> Harness {
    Harness::with_catalog(standard_catalog())
}

pub fn aws_settings(region: &str) -> Value {
    json!({ "region": region })
}

pub fn aws_settings_with_secret(region: &str, secret: &str) -> Value {
    json!({
        "region": region,
        "secret_key": { "from_secrets": false, "value": secret }
    })
}

pub fn chat_model(id: &str) -> Value {
    json!({ "id": id, "capabilities": { "chat_completion": true } })
}

pub fn embedding_model(id: &str) -> Value {
    json!({ "id": id, "capabilities": { "chat_completion": false } })
}

pub fn ai_settings(models: Vec<Value>) -> Value {
    json!({ "models": models })
}
