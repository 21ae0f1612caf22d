//! Secret vault behaviour tests against the in-memory adapter.

use integration_registry::integration::{
    adapters::memory::{InMemorySecretVault, secret_reference},
    domain::{Integration, IntegrationId, Scope, SecretField},
    ports::{SecretAdapter, SecretAdapterError},
};
use rstest::rstest;
use serde_json::json;

use super::helpers::{NEIGHBOUR, TENANT, new_record, settings, vault};

fn record_with_secret(scope: Scope, secret: &str) -> Integration {
    new_record("aws", "clouds", scope)
        .with_settings(settings(json!({
            "region": "eu",
            "secret_key": { "from_secrets": false, "value": secret }
        })))
        .into_integration(IntegrationId::new(1), false)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn store_replaces_plaintext_with_references(vault: InMemorySecretVault) {
    let record = record_with_secret(Scope::Tenant(TENANT), "s3cr3t");

    let stored = vault.store(&record).await.expect("store");

    let field = stored.secret_field("secret_key").expect("secret field");
    assert!(field.from_secrets);
    assert!(field.value.starts_with("{{secret.aws_secret_key_"));
    assert_eq!(stored.get("region"), Some(&json!("eu")));
    assert_eq!(vault.secret_count(Scope::Tenant(TENANT)).expect("count"), 1);
    assert_eq!(vault.secret_count(Scope::Administration).expect("count"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn partitions_do_not_leak_between_tenants(vault: InMemorySecretVault) {
    let record = record_with_secret(Scope::Tenant(TENANT), "s3cr3t");
    let stored = vault.store(&record).await.expect("store");

    let own = vault
        .unsecret(&stored, Scope::Tenant(TENANT))
        .await
        .expect("own partition");
    assert_eq!(
        own.secret_field("secret_key"),
        Some(SecretField::plaintext("s3cr3t"))
    );

    let foreign = vault.unsecret(&stored, Scope::Tenant(NEIGHBOUR)).await;
    assert!(matches!(
        foreign,
        Err(SecretAdapterError::UnknownReference { scope, .. }) if scope == Scope::Tenant(NEIGHBOUR)
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn replace_keeps_echoed_reference(vault: InMemorySecretVault) {
    let record = record_with_secret(Scope::Administration, "s3cr3t");
    let stored = vault.store(&record).await.expect("store");
    let current = record.with_settings(stored.clone());

    let replaced = vault
        .replace(&current, stored.clone())
        .await
        .expect("replace");

    assert_eq!(replaced, stored);
    assert_eq!(vault.secret_count(Scope::Administration).expect("count"), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_secret_reads_operator_values(vault: InMemorySecretVault) {
    vault
        .put_secret(Scope::Tenant(TENANT), "default_model", "3___gpt")
        .expect("put");

    let found = vault
        .get_secret("default_model", Scope::Tenant(TENANT))
        .await
        .expect("read");
    let missing = vault
        .get_secret("default_model", Scope::Administration)
        .await
        .expect("read");

    assert_eq!(found.as_deref(), Some("3___gpt"));
    assert!(missing.is_none());
    assert_eq!(secret_reference("k"), "{{secret.k}}");
}
