//! Output shapes of the resolution engine.

use super::{Integration, SectionName};
use serde::{Deserialize, Serialize};

/// An integration as seen from one scope, with its effective default flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedIntegration {
    /// The record, with `settings.models[*].default` rewritten for the
    /// capability section.
    pub integration: Integration,
    /// Whether this record is the scope's default for its type.
    pub is_default: bool,
}

/// Resolved integrations of one section, in list order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionGroup {
    /// Section name.
    pub section: SectionName,
    /// Integrations of the section.
    pub integrations: Vec<ResolvedIntegration>,
}

/// Result of a resolve call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resolution {
    /// Ordered flat list.
    Flat(Vec<ResolvedIntegration>),
    /// Groups in first-appearance order.
    Grouped(Vec<SectionGroup>),
}

impl Resolution {
    /// Returns every entry in list order, flattening groups.
    #[must_use]
    pub fn into_flat(self) -> Vec<ResolvedIntegration> {
        match self {
            Self::Flat(items) => items,
            Self::Grouped(groups) => groups
                .into_iter()
                .flat_map(|group| group.integrations)
                .collect(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(items) => items.len(),
            Self::Grouped(groups) => groups.iter().map(|g| g.integrations.len()).sum(),
        }
    }

    /// Returns `true` when no entries were resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
