//! Per-tenant default pointers.

use super::{IntegrationName, IntegrationRef, PointerId, ProjectId, SectionName};
use serde::{Deserialize, Serialize};

/// Names the effective default instance of a type for one tenant.
///
/// The target is either a shared administration record or one of the
/// tenant's own records. A tenant holds at most one pointer per type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultPointer {
    /// Store-assigned identifier.
    pub id: PointerId,
    /// Tenant whose table holds the pointer.
    pub tenant: ProjectId,
    /// Type name the pointer selects a default for.
    pub name: IntegrationName,
    /// The selected record.
    pub target: IntegrationRef,
    /// Section of the type.
    pub section: SectionName,
}

impl DefaultPointer {
    /// Returns `true` when this pointer selects `target` for `name`.
    #[must_use]
    pub fn selects(&self, name: &IntegrationName, target: IntegrationRef) -> bool {
        self.name == *name && self.target == target
    }
}
