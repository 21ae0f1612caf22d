//! Record persistence against a real database: uid ledger, updates,
//! deletes and listing.

use integration_registry::integration::{
    domain::{IntegrationId, IntegrationRef, IntegrationSettings, IntegrationUid, Scope},
    ports::{IntegrationStore, IntegrationStoreError, RecordFilter},
};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use serde_json::json;

use super::helpers::{
    CleanupGuard, NEIGHBOUR, TENANT, database_name, ensure_template, new_record, setup_store,
    shared_record, test_runtime,
};

#[rstest]
fn uid_is_never_reissued_after_delete(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("test_uid_ledger");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name, 1).expect("store setup");
    let rt = test_runtime();

    let uid = IntegrationUid::new("fixed-uid").expect("valid uid");
    let with_uid = |scope| {
        let mut request = new_record("slack", "notifications", scope);
        request.uid = uid.clone();
        request
    };
    let created = rt
        .block_on(store.insert(with_uid(Scope::Administration)))
        .expect("first insert");

    let cross_scope = rt.block_on(store.insert(with_uid(Scope::Tenant(TENANT))));
    assert!(matches!(
        cross_scope,
        Err(IntegrationStoreError::DuplicateUid(ref duplicate)) if duplicate == &uid
    ));

    rt.block_on(store.delete(created.reference()))
        .expect("delete")
        .expect("record existed");
    let reused = rt.block_on(store.insert(with_uid(Scope::Administration)));
    assert!(matches!(reused, Err(IntegrationStoreError::DuplicateUid(_))));
}

#[rstest]
fn update_persists_fields_and_keeps_default_flag(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("test_update");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name, 1).expect("store setup");
    let rt = test_runtime();

    let created = rt
        .block_on(store.insert(new_record("aws", "clouds", Scope::Administration)))
        .expect("insert");
    assert!(created.is_default());

    let mut edited = created.clone();
    edited.set_default_flag(false);
    edited.replace_settings(
        IntegrationSettings::new(json!({ "region": "eu" })).expect("object settings"),
        &DefaultClock,
    );
    edited.set_status("pending", &DefaultClock);
    edited.set_task_id(Some("task-9".to_owned()), &DefaultClock);
    rt.block_on(store.update(&edited)).expect("update");

    let stored = rt
        .block_on(store.find_by_id(created.reference()))
        .expect("lookup")
        .expect("record exists");
    assert!(stored.is_default());
    assert_eq!(stored.settings().get("region"), Some(&json!("eu")));
    assert_eq!(stored.status(), "pending");
    assert_eq!(stored.task_id(), Some("task-9"));
}

#[rstest]
fn missing_records_are_reported(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("test_missing");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name, 1).expect("store setup");
    let rt = test_runtime();

    let ghost = rt
        .block_on(store.insert(new_record("aws", "clouds", Scope::Tenant(TENANT))))
        .expect("insert");
    rt.block_on(store.delete(ghost.reference())).expect("delete");

    assert!(matches!(
        rt.block_on(store.update(&ghost)),
        Err(IntegrationStoreError::NotFound(target)) if target == ghost.reference()
    ));
    assert!(matches!(
        rt.block_on(store.update_and_promote(&ghost)),
        Err(IntegrationStoreError::NotFound(_))
    ));
    assert!(matches!(
        rt.block_on(store.promote_admin_default(IntegrationId::new(404))),
        Err(IntegrationStoreError::NotFound(_))
    ));
    assert!(matches!(
        rt.block_on(store.set_pointer(TENANT, ghost.reference())),
        Err(IntegrationStoreError::NotFound(_))
    ));
    assert_eq!(
        rt.block_on(store.delete(ghost.reference())).expect("second delete"),
        None
    );
}

#[rstest]
fn deleting_a_record_removes_every_pointer_to_it(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("test_delete_cascade");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name, 1).expect("store setup");
    let rt = test_runtime();

    let shared = rt
        .block_on(store.insert(shared_record("aws", "clouds")))
        .expect("shared insert");
    let own = rt
        .block_on(store.insert(new_record("slack", "notifications", Scope::Tenant(TENANT))))
        .expect("tenant insert");
    for tenant in [TENANT, NEIGHBOUR] {
        rt.block_on(store.set_pointer(tenant, shared.reference()))
            .expect("point at shared record");
    }

    rt.block_on(store.delete(shared.reference()))
        .expect("delete")
        .expect("record existed");

    let remaining: Vec<IntegrationRef> = rt
        .block_on(store.pointers(TENANT))
        .expect("pointers")
        .into_iter()
        .map(|pointer| pointer.target)
        .collect();
    assert_eq!(remaining, vec![own.reference()]);
    assert!(rt.block_on(store.pointers(NEIGHBOUR)).expect("pointers").is_empty());
}

#[rstest]
fn tenant_tables_are_partitioned(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("test_partition");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name, 1).expect("store setup");
    let rt = test_runtime();

    let own = rt
        .block_on(store.insert(new_record("aws", "clouds", Scope::Tenant(TENANT))))
        .expect("tenant insert");
    rt.block_on(store.insert(new_record("aws", "clouds", Scope::Tenant(NEIGHBOUR))))
        .expect("neighbour insert");

    let listed = rt
        .block_on(store.list(Scope::Tenant(TENANT), &RecordFilter::all()))
        .expect("list");
    assert_eq!(listed, vec![own.clone()]);
    let by_uid = rt
        .block_on(store.find_by_uid(own.uid(), Scope::Tenant(NEIGHBOUR)))
        .expect("lookup");
    assert_eq!(by_uid, None);
    let foreign = IntegrationRef::project(NEIGHBOUR, own.id());
    let found = rt.block_on(store.find_by_id(foreign)).expect("lookup");
    assert_eq!(found, None);
}

#[rstest]
fn list_applies_name_and_shared_filters(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = database_name("test_list_filters");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let store = setup_store(shared_test_cluster, &db_name, 1).expect("store setup");
    let rt = test_runtime();

    let shared = rt
        .block_on(store.insert(shared_record("aws", "clouds")))
        .expect("shared");
    rt.block_on(store.insert(new_record("aws", "clouds", Scope::Administration)))
        .expect("private");
    rt.block_on(store.insert(new_record("slack", "notifications", Scope::Administration)))
        .expect("slack");

    let shared_only = rt
        .block_on(store.list(Scope::Administration, &RecordFilter::all().shared()))
        .expect("list shared");
    assert_eq!(shared_only, vec![shared]);

    let aws_name = new_record("aws", "clouds", Scope::Administration).name;
    let by_name = rt
        .block_on(store.list(Scope::Administration, &RecordFilter::by_name(aws_name)))
        .expect("list by name");
    assert_eq!(by_name.len(), 2);
}
