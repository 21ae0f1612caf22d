//! In-memory record store for tests and local use.
//!
//! Every trait method runs under a single write (or read) lock, which makes
//! each call one atomic unit just like a database transaction would.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::integration::{
    domain::{
        DefaultPointer, Integration, IntegrationId, IntegrationRef, IntegrationUid,
        NewIntegration, PointerId, ProjectId, Scope,
    },
    ports::{IntegrationStore, IntegrationStoreError, IntegrationStoreResult, RecordFilter},
};

type Table = BTreeMap<IntegrationId, Integration>;

/// Thread-safe in-memory integration store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIntegrationStore {
    state: Arc<RwLock<InMemoryStoreState>>,
}

#[derive(Debug, Default)]
struct InMemoryStoreState {
    administration: Table,
    projects: HashMap<ProjectId, Table>,
    pointers: HashMap<ProjectId, Vec<DefaultPointer>>,
    issued_uids: HashSet<IntegrationUid>,
    last_admin_id: i64,
    last_project_ids: HashMap<ProjectId, i64>,
    last_pointer_id: i64,
}

impl InMemoryStoreState {
    fn table(&self, owner: Scope) -> Option<&Table> {
        match owner {
            Scope::Administration => Some(&self.administration),
            Scope::Tenant(project) => self.projects.get(&project),
        }
    }

    fn table_mut(&mut self, owner: Scope) -> &mut Table {
        match owner {
            Scope::Administration => &mut self.administration,
            Scope::Tenant(project) => self.projects.entry(project).or_default(),
        }
    }

    fn record(&self, target: IntegrationRef) -> Option<&Integration> {
        self.table(target.owner)?.get(&target.id)
    }

    fn next_id(&mut self, owner: Scope) -> IntegrationId {
        let counter = match owner {
            Scope::Administration => &mut self.last_admin_id,
            Scope::Tenant(project) => self.last_project_ids.entry(project).or_default(),
        };
        *counter += 1;
        IntegrationId::new(*counter)
    }

    fn next_pointer_id(&mut self) -> PointerId {
        self.last_pointer_id += 1;
        PointerId::new(self.last_pointer_id)
    }

    fn shared_admin_record_exists(&self, integration: &NewIntegration) -> bool {
        self.administration
            .values()
            .any(|record| record.name() == &integration.name && record.is_shared())
    }

    fn admin_default_exists(&self, integration: &NewIntegration) -> bool {
        self.administration
            .values()
            .any(|record| record.name() == &integration.name && record.is_default())
    }

    fn tenant_has_pointer(&self, tenant: ProjectId, integration: &NewIntegration) -> bool {
        self.pointers
            .get(&tenant)
            .is_some_and(|pointers| pointers.iter().any(|p| p.name == integration.name))
    }

    fn upsert_pointer(&mut self, tenant: ProjectId, target: &Integration) -> DefaultPointer {
        let next_id = self.next_pointer_id();
        let pointers = self.pointers.entry(tenant).or_default();
        if let Some(existing) = pointers.iter_mut().find(|p| &p.name == target.name()) {
            existing.target = target.reference();
            existing.section = target.section().clone();
            return existing.clone();
        }
        let pointer = DefaultPointer {
            id: next_id,
            tenant,
            name: target.name().clone(),
            target: target.reference(),
            section: target.section().clone(),
        };
        pointers.push(pointer.clone());
        pointer
    }
}

impl InMemoryIntegrationStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> IntegrationStoreResult<RwLockReadGuard<'_, InMemoryStoreState>> {
        self.state.read().map_err(|err| {
            IntegrationStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> IntegrationStoreResult<RwLockWriteGuard<'_, InMemoryStoreState>> {
        self.state.write().map_err(|err| {
            IntegrationStoreError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

#[async_trait]
impl IntegrationStore for InMemoryIntegrationStore {
    async fn insert(&self, integration: NewIntegration) -> IntegrationStoreResult<Integration> {
        let mut state = self.write()?;

        if state.issued_uids.contains(&integration.uid) {
            return Err(IntegrationStoreError::DuplicateUid(integration.uid));
        }

        let owner = integration.scope;
        let (is_default, create_pointer) = match owner {
            Scope::Administration => (!state.admin_default_exists(&integration), None),
            Scope::Tenant(tenant) => {
                let needs_pointer = !state.shared_admin_record_exists(&integration)
                    && !state.tenant_has_pointer(tenant, &integration);
                (false, needs_pointer.then_some(tenant))
            }
        };

        let id = state.next_id(owner);
        let record = integration.into_integration(id, is_default);
        state.issued_uids.insert(record.uid().clone());
        state.table_mut(owner).insert(id, record.clone());
        if let Some(tenant) = create_pointer {
            state.upsert_pointer(tenant, &record);
        }
        Ok(record)
    }

    async fn update(&self, integration: &Integration) -> IntegrationStoreResult<()> {
        let mut state = self.write()?;
        let target = integration.reference();
        let existing = state
            .table_mut(target.owner)
            .get_mut(&target.id)
            .ok_or(IntegrationStoreError::NotFound(target))?;

        let mut updated = integration.clone();
        updated.set_default_flag(existing.is_default());
        *existing = updated;
        Ok(())
    }

    async fn update_and_promote(
        &self,
        integration: &Integration,
    ) -> IntegrationStoreResult<Integration> {
        let mut state = self.write()?;
        let target = integration.reference();
        let Some(persisted_flag) = state.record(target).map(Integration::is_default) else {
            return Err(IntegrationStoreError::NotFound(target));
        };

        let mut stored = integration.clone();
        match target.owner {
            Scope::Administration => {
                for record in state.administration.values_mut() {
                    if record.name() == stored.name() {
                        record.set_default_flag(false);
                    }
                }
                stored.set_default_flag(true);
            }
            Scope::Tenant(tenant) => {
                stored.set_default_flag(persisted_flag);
                state.upsert_pointer(tenant, &stored);
            }
        }
        state.table_mut(target.owner).insert(target.id, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, target: IntegrationRef) -> IntegrationStoreResult<Option<Integration>> {
        let mut state = self.write()?;
        let Some(removed) = state.table_mut(target.owner).remove(&target.id) else {
            return Ok(None);
        };
        for pointers in state.pointers.values_mut() {
            pointers.retain(|pointer| pointer.target != target);
        }
        Ok(Some(removed))
    }

    async fn find_by_id(
        &self,
        target: IntegrationRef,
    ) -> IntegrationStoreResult<Option<Integration>> {
        let state = self.read()?;
        Ok(state.record(target).cloned())
    }

    async fn find_by_uid(
        &self,
        uid: &IntegrationUid,
        owner: Scope,
    ) -> IntegrationStoreResult<Option<Integration>> {
        let state = self.read()?;
        let found = state
            .table(owner)
            .and_then(|table| table.values().find(|record| record.uid() == uid))
            .cloned();
        Ok(found)
    }

    async fn list(
        &self,
        owner: Scope,
        filter: &RecordFilter,
    ) -> IntegrationStoreResult<Vec<Integration>> {
        let state = self.read()?;
        let records = state
            .table(owner)
            .map(|table| {
                table
                    .values()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn pointers(&self, tenant: ProjectId) -> IntegrationStoreResult<Vec<DefaultPointer>> {
        let state = self.read()?;
        Ok(state.pointers.get(&tenant).cloned().unwrap_or_default())
    }

    async fn set_pointer(
        &self,
        tenant: ProjectId,
        target: IntegrationRef,
    ) -> IntegrationStoreResult<DefaultPointer> {
        let mut state = self.write()?;
        if matches!(target.owner, Scope::Tenant(owner) if owner != tenant) {
            return Err(IntegrationStoreError::NotFound(target));
        }
        let record = state
            .record(target)
            .cloned()
            .ok_or(IntegrationStoreError::NotFound(target))?;
        Ok(state.upsert_pointer(tenant, &record))
    }

    async fn promote_admin_default(
        &self,
        id: IntegrationId,
    ) -> IntegrationStoreResult<Integration> {
        let mut state = self.write()?;
        let target = IntegrationRef::administration(id);
        let name = state
            .administration
            .get(&id)
            .map(|record| record.name().clone())
            .ok_or(IntegrationStoreError::NotFound(target))?;

        for record in state.administration.values_mut() {
            if record.name() == &name {
                record.set_default_flag(record.id() == id);
            }
        }
        state
            .administration
            .get(&id)
            .cloned()
            .ok_or(IntegrationStoreError::NotFound(target))
    }
}
