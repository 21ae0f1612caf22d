//! End-to-end flows through the resolver and orchestrator.

use integration_registry::integration::{
    domain::{IntegrationEvent, Scope},
    ports::IntegrationStore,
    services::{IntegrationPayload, ResolveQuery},
};
use rstest::rstest;
use serde_json::json;

use super::helpers::{NEIGHBOUR, Services, TENANT, services};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn new_tenant_inherits_shared_defaults(services: Services) {
    let shared = services
        .orchestrator
        .create(
            "aws",
            Scope::Administration,
            IntegrationPayload::new(json!({ "region": "eu" }))
                .with_config(json!({ "is_shared": true, "name": "Platform AWS" })),
        )
        .await
        .expect("create shared");

    services
        .directory
        .add_project(NEIGHBOUR)
        .expect("register tenant");
    let seeded = services
        .orchestrator
        .seed_tenant_defaults(NEIGHBOUR)
        .await
        .expect("seed");
    assert_eq!(seeded.len(), 1);

    let resolved = services
        .resolver
        .resolve(&ResolveQuery::new(Scope::Tenant(NEIGHBOUR)))
        .await
        .expect("resolve")
        .into_flat();
    let first = resolved.first().expect("one entry");
    assert!(first.is_default);
    assert_eq!(first.integration.reference(), shared.reference());
    assert_eq!(first.integration.config().display_name(), Some("Platform AWS"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tenant_override_then_delete_leaves_no_default(services: Services) {
    services
        .orchestrator
        .create(
            "slack",
            Scope::Administration,
            IntegrationPayload::new(json!({})).with_config(json!({ "is_shared": true })),
        )
        .await
        .expect("shared slack");
    let own = services
        .orchestrator
        .create(
            "slack",
            Scope::Tenant(TENANT),
            IntegrationPayload::new(json!({})).make_default(),
        )
        .await
        .expect("own slack");

    let before = services
        .resolver
        .default_for(Scope::Tenant(TENANT), "slack")
        .await
        .expect("default");
    assert_eq!(before.map(|r| r.reference()), Some(own.reference()));

    services
        .orchestrator
        .delete(own.reference())
        .await
        .expect("delete");
    let after = services
        .resolver
        .default_for(Scope::Tenant(TENANT), "slack")
        .await
        .expect("default");
    assert!(after.is_none());
    assert!(
        services
            .store
            .pointers(TENANT)
            .await
            .expect("pointers")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_mutation_is_announced(services: Services) {
    let created = services
        .orchestrator
        .create("openai", Scope::Tenant(TENANT), IntegrationPayload::new(json!({})))
        .await
        .expect("create");
    services
        .orchestrator
        .update(
            created.reference(),
            IntegrationPayload::new(json!({ "models": [] })),
        )
        .await
        .expect("update");

    let names: Vec<String> = services
        .notifier
        .events()
        .into_iter()
        .map(|event| event.event_name)
        .collect();
    assert_eq!(
        names,
        ["openai_created_or_updated", "integration_settings_changed"]
    );
    let last = services.notifier.events().pop().expect("event");
    assert!(matches!(
        last.payload,
        IntegrationEvent::SettingsChanged { ref project_ids, .. } if project_ids == &[TENANT]
    ));
}
