//! Record store contract tests against the in-memory adapter.

use integration_registry::integration::{
    adapters::memory::InMemoryIntegrationStore,
    domain::{IntegrationId, IntegrationRef, Scope},
    ports::{IntegrationStore, IntegrationStoreError, RecordFilter},
};
use rstest::rstest;
use serde_json::json;

use super::helpers::{NEIGHBOUR, TENANT, new_record, settings, shared_record, store};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_insert_flags_only_first_record_of_a_name(store: InMemoryIntegrationStore) {
    let first = store
        .insert(new_record("aws", "clouds", Scope::Administration))
        .await
        .expect("first insert");
    let second = store
        .insert(new_record("aws", "clouds", Scope::Administration))
        .await
        .expect("second insert");
    let other = store
        .insert(new_record("slack", "notifications", Scope::Administration))
        .await
        .expect("other insert");

    assert!(first.is_default());
    assert!(!second.is_default());
    assert!(other.is_default());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tenant_tables_are_isolated(store: InMemoryIntegrationStore) {
    let own = store
        .insert(new_record("aws", "clouds", Scope::Tenant(TENANT)))
        .await
        .expect("own insert");
    store
        .insert(new_record("aws", "clouds", Scope::Tenant(NEIGHBOUR)))
        .await
        .expect("neighbour insert");

    let listed = store
        .list(Scope::Tenant(TENANT), &RecordFilter::all())
        .await
        .expect("list");
    assert_eq!(listed, vec![own.clone()]);

    let foreign = store
        .find_by_uid(own.uid(), Scope::Tenant(NEIGHBOUR))
        .await
        .expect("lookup");
    assert!(foreign.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_pointer_rejects_another_tenants_record(store: InMemoryIntegrationStore) {
    let foreign = store
        .insert(new_record("aws", "clouds", Scope::Tenant(NEIGHBOUR)))
        .await
        .expect("insert");

    let result = store.set_pointer(TENANT, foreign.reference()).await;
    assert!(matches!(result, Err(IntegrationStoreError::NotFound(_))));
    assert!(store.pointers(TENANT).await.expect("pointers").is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn set_pointer_keeps_one_pointer_per_name(store: InMemoryIntegrationStore) {
    let shared = store
        .insert(shared_record("aws", "clouds"))
        .await
        .expect("shared");
    let own = store
        .insert(new_record("aws", "clouds", Scope::Tenant(TENANT)))
        .await
        .expect("own");

    store
        .set_pointer(TENANT, shared.reference())
        .await
        .expect("point at shared");
    let pointer = store
        .set_pointer(TENANT, own.reference())
        .await
        .expect("point at own");

    let pointers = store.pointers(TENANT).await.expect("pointers");
    assert_eq!(pointers, vec![pointer]);
    assert_eq!(
        pointers.first().map(|p| p.target),
        Some(own.reference())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_removes_pointers_in_every_tenant(store: InMemoryIntegrationStore) {
    let shared = store
        .insert(shared_record("slack", "notifications"))
        .await
        .expect("shared");
    for tenant in [TENANT, NEIGHBOUR] {
        store
            .set_pointer(tenant, shared.reference())
            .await
            .expect("pointer");
    }

    let deleted = store.delete(shared.reference()).await.expect("delete");
    assert_eq!(deleted.map(|r| r.id()), Some(shared.id()));
    for tenant in [TENANT, NEIGHBOUR] {
        assert!(store.pointers(tenant).await.expect("pointers").is_empty());
    }
    let missing = store.delete(shared.reference()).await.expect("second delete");
    assert!(missing.is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_keeps_persisted_default_flag(store: InMemoryIntegrationStore) {
    let created = store
        .insert(new_record("aws", "clouds", Scope::Administration))
        .await
        .expect("insert");

    let mut edited = created.clone();
    edited.set_default_flag(false);
    edited.replace_settings(settings(json!({ "region": "eu" })), &mockable::DefaultClock);
    store.update(&edited).await.expect("update");

    let stored = store
        .find_by_id(created.reference())
        .await
        .expect("lookup")
        .expect("record exists");
    assert!(stored.is_default());
    assert_eq!(stored.settings().get("region"), Some(&json!("eu")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_and_promote_report_missing_records(store: InMemoryIntegrationStore) {
    let ghost = store
        .insert(new_record("aws", "clouds", Scope::Administration))
        .await
        .expect("insert");
    store.delete(ghost.reference()).await.expect("delete");

    assert!(matches!(
        store.update(&ghost).await,
        Err(IntegrationStoreError::NotFound(_))
    ));
    assert!(matches!(
        store.update_and_promote(&ghost).await,
        Err(IntegrationStoreError::NotFound(_))
    ));
    assert!(matches!(
        store.promote_admin_default(IntegrationId::new(404)).await,
        Err(IntegrationStoreError::NotFound(target))
            if target == IntegrationRef::administration(IntegrationId::new(404))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_and_promote_moves_admin_flag_with_new_settings(store: InMemoryIntegrationStore) {
    let first = store
        .insert(new_record("aws", "clouds", Scope::Administration))
        .await
        .expect("first");
    let second = store
        .insert(new_record("aws", "clouds", Scope::Administration))
        .await
        .expect("second");

    let mut edited = second.clone();
    edited.replace_settings(settings(json!({ "region": "us" })), &mockable::DefaultClock);
    let promoted = store.update_and_promote(&edited).await.expect("promote");

    assert!(promoted.is_default());
    assert_eq!(promoted.settings().get("region"), Some(&json!("us")));
    let demoted = store
        .find_by_id(first.reference())
        .await
        .expect("lookup")
        .expect("record exists");
    assert!(!demoted.is_default());
    let stored = store
        .find_by_id(second.reference())
        .await
        .expect("lookup")
        .expect("record exists");
    assert_eq!(stored, promoted);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_and_promote_repoints_tenant(store: InMemoryIntegrationStore) {
    let first = store
        .insert(new_record("slack", "notifications", Scope::Tenant(TENANT)))
        .await
        .expect("first");
    let second = store
        .insert(new_record("slack", "notifications", Scope::Tenant(TENANT)))
        .await
        .expect("second");
    let before = store.pointers(TENANT).await.expect("pointers");
    assert!(before.iter().all(|p| p.target == first.reference()));

    let mut edited = second.clone();
    edited.replace_settings(settings(json!({ "channel": "ops" })), &mockable::DefaultClock);
    store.update_and_promote(&edited).await.expect("promote");

    let pointers = store.pointers(TENANT).await.expect("pointers");
    assert_eq!(pointers.len(), 1);
    assert!(pointers.iter().all(|p| p.target == second.reference()));
    let stored = store
        .find_by_id(second.reference())
        .await
        .expect("lookup")
        .expect("record exists");
    assert_eq!(stored.settings().get("channel"), Some(&json!("ops")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_filters_shared_records(store: InMemoryIntegrationStore) {
    let shared = store
        .insert(shared_record("aws", "clouds"))
        .await
        .expect("shared");
    store
        .insert(new_record("aws", "clouds", Scope::Administration))
        .await
        .expect("private");

    let listed = store
        .list(Scope::Administration, &RecordFilter::all().shared())
        .await
        .expect("list");
    assert_eq!(listed.iter().map(|r| r.id()).collect::<Vec<_>>(), vec![shared.id()]);
}
