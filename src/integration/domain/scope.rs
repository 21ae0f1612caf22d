//! Ownership scope of integration records.

use super::ProjectId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The context that owns an integration record or a read.
///
/// Administration records live in one global table; tenant records live in
/// the table of a single project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// The global administration context.
    Administration,
    /// A single tenant ("project") context.
    Tenant(ProjectId),
}

impl Scope {
    /// Returns the tenant identifier for tenant scopes.
    #[must_use]
    pub const fn tenant(self) -> Option<ProjectId> {
        match self {
            Self::Administration => None,
            Self::Tenant(project) => Some(project),
        }
    }

    /// Returns `true` for the administration scope.
    #[must_use]
    pub const fn is_administration(self) -> bool {
        matches!(self, Self::Administration)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Administration => f.write_str("administration"),
            Self::Tenant(project) => write!(f, "project:{project}"),
        }
    }
}
