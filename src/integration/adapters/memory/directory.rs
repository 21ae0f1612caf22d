//! Fixed tenant directory.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use crate::integration::{
    domain::ProjectId,
    ports::{TenantDirectory, TenantDirectoryError, TenantDirectoryResult},
};

/// [`TenantDirectory`] over a mutable in-memory set of tenants, listed in
/// ascending id order.
#[derive(Debug, Clone, Default)]
pub struct StaticTenantDirectory {
    projects: Arc<RwLock<BTreeSet<ProjectId>>>,
}

impl StaticTenantDirectory {
    /// Creates a directory listing `projects`.
    #[must_use]
    pub fn new(projects: impl IntoIterator<Item = ProjectId>) -> Self {
        Self {
            projects: Arc::new(RwLock::new(projects.into_iter().collect())),
        }
    }

    /// Adds a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`TenantDirectoryError::Unavailable`] when the lock is
    /// poisoned.
    pub fn add_project(&self, project: ProjectId) -> TenantDirectoryResult<()> {
        let mut projects = self.projects.write().map_err(|err| {
            TenantDirectoryError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        projects.insert(project);
        Ok(())
    }
}

#[async_trait]
impl TenantDirectory for StaticTenantDirectory {
    async fn list_projects(&self) -> TenantDirectoryResult<Vec<ProjectId>> {
        let projects = self.projects.read().map_err(|err| {
            TenantDirectoryError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        Ok(projects.iter().copied().collect())
    }
}
