//! Resolution engine: the effective, defaulted view of integrations for a
//! scope.
//!
//! A tenant sees its own records plus every shared administration record.
//! Defaults inside a tenant come from its pointers; the administration view
//! uses the persisted flag. Results are ordered deterministically, then the
//! caller's sort and page are applied, then default-model selection runs over
//! the capability section.

use crate::integration::{
    domain::{
        DefaultPointer, Integration, IntegrationName, IntegrationRef, IntegrationUid, ProjectId,
        Resolution, ResolvedIntegration, Scope, SectionName,
    },
    ports::{IntegrationStore, RecordFilter, SecretAdapter, TenantDirectory},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::{
    IntegrationCatalog, IntegrationServiceResult, ResolverConfig,
    model_defaults::{DefaultModelPointer, mark_default_models},
    ordering::{PageSpec, SortSpec, group_by_section, order_defaults_first},
};

/// Narrows a resolve call to one type or one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolveFilter {
    /// Every registered type.
    #[default]
    All,
    /// One type, by raw name.
    Name(String),
    /// One section, by raw name.
    Section(String),
}

/// Parameters of a resolve call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveQuery {
    /// Scope whose view is resolved.
    pub scope: Scope,
    /// Type or section restriction.
    pub filter: ResolveFilter,
    /// Whether to return section groups instead of a flat list.
    pub group_by_section: bool,
    /// Caller sort override.
    pub sort: Option<SortSpec>,
    /// Caller page window.
    pub page: Option<PageSpec>,
}

impl ResolveQuery {
    /// Resolves every registered type for `scope`.
    #[must_use]
    pub const fn new(scope: Scope) -> Self {
        Self {
            scope,
            filter: ResolveFilter::All,
            group_by_section: false,
            sort: None,
            page: None,
        }
    }

    /// Restricts the query to one type.
    #[must_use]
    pub fn by_name(mut self, name: impl Into<String>) -> Self {
        self.filter = ResolveFilter::Name(name.into());
        self
    }

    /// Restricts the query to one section.
    #[must_use]
    pub fn by_section(mut self, section: impl Into<String>) -> Self {
        self.filter = ResolveFilter::Section(section.into());
        self
    }

    /// Requests section groups.
    #[must_use]
    pub const fn grouped(mut self) -> Self {
        self.group_by_section = true;
        self
    }

    /// Applies a sort override.
    #[must_use]
    pub const fn sorted(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Applies a page window.
    #[must_use]
    pub const fn paged(mut self, page: PageSpec) -> Self {
        self.page = Some(page);
        self
    }
}

/// Read-side service over the record store.
#[derive(Clone)]
pub struct IntegrationResolver<S, V, D>
where
    S: IntegrationStore,
    V: SecretAdapter,
    D: TenantDirectory,
{
    catalog: Arc<IntegrationCatalog>,
    store: Arc<S>,
    secrets: Arc<V>,
    directory: Arc<D>,
    config: ResolverConfig,
}

impl<S, V, D> IntegrationResolver<S, V, D>
where
    S: IntegrationStore,
    V: SecretAdapter,
    D: TenantDirectory,
{
    /// Creates a resolver with the default configuration.
    #[must_use]
    pub fn new(
        catalog: Arc<IntegrationCatalog>,
        store: Arc<S>,
        secrets: Arc<V>,
        directory: Arc<D>,
    ) -> Self {
        Self {
            catalog,
            store,
            secrets,
            directory,
            config: ResolverConfig::default(),
        }
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves the ordered, defaulted view for a scope.
    ///
    /// Unknown type or section filters yield an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`super::IntegrationServiceError::Store`] when the store
    /// cannot be read.
    pub async fn resolve(&self, query: &ResolveQuery) -> IntegrationServiceResult<Resolution> {
        let Some(filter) = self.record_filter(&query.filter) else {
            return Ok(empty_resolution(query.group_by_section));
        };

        let records = self.gather(query.scope, &filter).await?;
        let mut resolved = self.flag_defaults(query.scope, records).await?;
        order_defaults_first(&mut resolved);
        if let Some(sort) = &query.sort {
            sort.apply(&mut resolved);
        }
        let mut window = match &query.page {
            Some(page) => page.apply(resolved),
            None => resolved,
        };
        self.select_default_models(query.scope, &mut window).await;

        debug!(scope = %query.scope, count = window.len(), "resolved integrations");
        Ok(if query.group_by_section {
            Resolution::Grouped(group_by_section(window))
        } else {
            Resolution::Flat(window)
        })
    }

    /// Looks up a record by owner and id. Unregistered types are absent.
    ///
    /// # Errors
    ///
    /// Returns [`super::IntegrationServiceError::Store`] when the store
    /// cannot be read.
    pub async fn find_by_id(
        &self,
        target: IntegrationRef,
    ) -> IntegrationServiceResult<Option<Integration>> {
        let record = self.store.find_by_id(target).await?;
        Ok(record.filter(|r| self.catalog.contains(r.name())))
    }

    /// Looks up a record by uid.
    ///
    /// Searches the tenant's table first when one is given, then the
    /// administration table, then, when `search_all_tenants` is set, every
    /// tenant listed by the directory.
    ///
    /// # Errors
    ///
    /// Returns [`super::IntegrationServiceError::Store`] or
    /// [`super::IntegrationServiceError::Directory`] when a collaborator
    /// fails.
    pub async fn find_by_uid(
        &self,
        uid: &IntegrationUid,
        tenant: Option<ProjectId>,
        search_all_tenants: bool,
    ) -> IntegrationServiceResult<Option<Integration>> {
        let mut owners: Vec<Scope> = tenant.into_iter().map(Scope::Tenant).collect();
        owners.push(Scope::Administration);
        if search_all_tenants {
            let projects = self.directory.list_projects().await?;
            owners.extend(
                projects
                    .into_iter()
                    .filter(|project| Some(*project) != tenant)
                    .map(Scope::Tenant),
            );
        }

        for owner in owners {
            if let Some(record) = self.store.find_by_uid(uid, owner).await?
                && self.catalog.contains(record.name())
            {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Returns the tenant's default pointers for registered types.
    ///
    /// # Errors
    ///
    /// Returns [`super::IntegrationServiceError::Store`] when the store
    /// cannot be read.
    pub async fn defaults(&self, tenant: ProjectId) -> IntegrationServiceResult<Vec<DefaultPointer>> {
        let pointers = self.store.pointers(tenant).await?;
        Ok(pointers
            .into_iter()
            .filter(|pointer| self.catalog.contains(&pointer.name))
            .collect())
    }

    /// Returns the administration records flagged default.
    ///
    /// # Errors
    ///
    /// Returns [`super::IntegrationServiceError::Store`] when the store
    /// cannot be read.
    pub async fn admin_defaults(&self) -> IntegrationServiceResult<Vec<Integration>> {
        let records = self
            .store
            .list(Scope::Administration, &RecordFilter::all())
            .await?;
        Ok(records
            .into_iter()
            .filter(|record| record.is_default() && self.catalog.contains(record.name()))
            .collect())
    }

    /// Returns the effective default record of a type for a scope.
    ///
    /// For a tenant this follows its pointer; a pointer to an administration
    /// record that is no longer shared resolves to nothing.
    ///
    /// # Errors
    ///
    /// Returns [`super::IntegrationServiceError::Store`] when the store
    /// cannot be read.
    pub async fn default_for(
        &self,
        scope: Scope,
        name: &str,
    ) -> IntegrationServiceResult<Option<Integration>> {
        let Some(type_name) = self.registered_name(name) else {
            return Ok(None);
        };
        match scope {
            Scope::Administration => {
                let records = self
                    .store
                    .list(Scope::Administration, &RecordFilter::by_name(type_name))
                    .await?;
                Ok(records.into_iter().find(Integration::is_default))
            }
            Scope::Tenant(project) => {
                let selected = self
                    .store
                    .pointers(project)
                    .await?
                    .into_iter()
                    .find(|pointer| pointer.name == type_name);
                let Some(pointer) = selected else {
                    return Ok(None);
                };
                let record = self.store.find_by_id(pointer.target).await?;
                Ok(record.filter(|r| !r.scope().is_administration() || r.is_shared()))
            }
        }
    }

    /// Returns the records of one type in the scope's own table whose
    /// top-level setting `key` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns [`super::IntegrationServiceError::Store`] when the store
    /// cannot be read.
    pub async fn find_by_setting_value(
        &self,
        scope: Scope,
        name: &str,
        key: &str,
        value: &Value,
    ) -> IntegrationServiceResult<Vec<Integration>> {
        let Some(type_name) = self.registered_name(name) else {
            return Ok(Vec::new());
        };
        let records = self
            .store
            .list(scope, &RecordFilter::by_name(type_name))
            .await?;
        Ok(records
            .into_iter()
            .filter(|record| record.settings().get(key) == Some(value))
            .collect())
    }

    /// Returns a copy of `integration` whose secret fields hold plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`super::IntegrationServiceError::Secrets`] when a reference
    /// cannot be read from the vault.
    pub async fn reveal(&self, integration: &Integration) -> IntegrationServiceResult<Integration> {
        let settings = self
            .secrets
            .unsecret(integration.settings(), integration.scope())
            .await?;
        Ok(integration.clone().with_settings(settings))
    }

    fn registered_name(&self, name: &str) -> Option<IntegrationName> {
        let type_name = IntegrationName::new(name).ok()?;
        self.catalog.contains(&type_name).then_some(type_name)
    }

    fn record_filter(&self, filter: &ResolveFilter) -> Option<RecordFilter> {
        match filter {
            ResolveFilter::All => Some(RecordFilter::all()),
            ResolveFilter::Name(name) => self.registered_name(name).map(RecordFilter::by_name),
            ResolveFilter::Section(section) => {
                let section_name = SectionName::new(section.as_str()).ok()?;
                self.catalog
                    .has_section(section_name.as_str())
                    .then(|| RecordFilter::by_section(section_name))
            }
        }
    }

    async fn gather(
        &self,
        scope: Scope,
        filter: &RecordFilter,
    ) -> IntegrationServiceResult<Vec<Integration>> {
        let mut records = self.store.list(scope, filter).await?;
        if let Scope::Tenant(_) = scope {
            let shared = self
                .store
                .list(Scope::Administration, &filter.clone().shared())
                .await?;
            records.extend(shared);
        }
        records.retain(|record| self.catalog.contains(record.name()));
        Ok(records)
    }

    async fn flag_defaults(
        &self,
        scope: Scope,
        records: Vec<Integration>,
    ) -> IntegrationServiceResult<Vec<ResolvedIntegration>> {
        let pointers = match scope {
            Scope::Administration => Vec::new(),
            Scope::Tenant(project) => self.store.pointers(project).await?,
        };
        Ok(records
            .into_iter()
            .map(|integration| {
                let is_default = match scope {
                    Scope::Administration => integration.is_default(),
                    Scope::Tenant(_) => pointers
                        .iter()
                        .any(|p| p.selects(integration.name(), integration.reference())),
                };
                ResolvedIntegration {
                    integration,
                    is_default,
                }
            })
            .collect())
    }

    async fn select_default_models(&self, scope: Scope, items: &mut [ResolvedIntegration]) {
        let section = self.config.capability_section.as_str();
        if !items
            .iter()
            .any(|item| item.integration.section().as_str() == section)
        {
            return;
        }
        let pointer = self.default_model_pointer(scope).await;
        mark_default_models(items, section, pointer.as_ref());
    }

    async fn default_model_pointer(&self, scope: Scope) -> Option<DefaultModelPointer> {
        let raw = match self
            .secrets
            .get_secret(&self.config.default_model_secret, scope)
            .await
        {
            Ok(value) => value?,
            Err(err) => {
                debug!(scope = %scope, error = %err, "default model secret unavailable");
                return None;
            }
        };
        let parsed = DefaultModelPointer::parse(&raw, &self.config.pointer_separator);
        if parsed.is_none() {
            debug!(scope = %scope, value = %raw, "default model secret is not a valid pointer");
        }
        parsed
    }
}

const fn empty_resolution(grouped: bool) -> Resolution {
    if grouped {
        Resolution::Grouped(Vec::new())
    } else {
        Resolution::Flat(Vec::new())
    }
}
