//! Section descriptors grouping integration types.

use super::SectionName;
use serde::{Deserialize, Serialize};

/// Catalog entry describing a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionDescriptor {
    /// Section name.
    pub name: SectionName,
    /// Free-form description shown alongside integrations of the section.
    pub integration_description: String,
    /// Free-form description consumed by test planners.
    pub test_planner_description: String,
}

impl SectionDescriptor {
    /// Creates a section with empty descriptions.
    #[must_use]
    pub const fn bare(name: SectionName) -> Self {
        Self {
            name,
            integration_description: String::new(),
            test_planner_description: String::new(),
        }
    }
}
