//! Deterministic ordering, caller sort overrides, paging and grouping of
//! resolved integrations.

use crate::integration::domain::{ResolvedIntegration, SectionGroup};
use serde::Deserialize;
use std::cmp::Ordering;

/// Field a caller may sort the resolved list by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Store identifier.
    Id,
    /// Type name.
    Name,
    /// Section name.
    Section,
    /// Status string.
    Status,
    /// Config display name; records without one sort first.
    DisplayName,
    /// Effective default flag.
    IsDefault,
    /// Creation timestamp.
    CreatedAt,
    /// Last update timestamp.
    UpdatedAt,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Caller sort override applied after the base ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SortSpec {
    /// Sort field.
    pub key: SortKey,
    /// Sort direction.
    #[serde(default)]
    pub order: SortOrder,
}

impl SortSpec {
    /// Creates an ascending sort.
    #[must_use]
    pub const fn asc(key: SortKey) -> Self {
        Self {
            key,
            order: SortOrder::Asc,
        }
    }

    /// Creates a descending sort.
    #[must_use]
    pub const fn desc(key: SortKey) -> Self {
        Self {
            key,
            order: SortOrder::Desc,
        }
    }

    /// Stable-sorts `items`; entries with equal keys keep their order.
    pub fn apply(&self, items: &mut [ResolvedIntegration]) {
        items.sort_by(|left, right| {
            let ordering = compare_by_key(self.key, left, right);
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
    }
}

/// Window over the sorted list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageSpec {
    /// Number of leading entries to skip.
    #[serde(default)]
    pub offset: usize,
    /// Maximum number of entries to keep; `None` keeps the rest.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl PageSpec {
    /// Creates a page window.
    #[must_use]
    pub const fn new(offset: usize, limit: Option<usize>) -> Self {
        Self { offset, limit }
    }

    /// Skips `offset` entries then keeps at most `limit`.
    #[must_use]
    pub fn apply(&self, items: Vec<ResolvedIntegration>) -> Vec<ResolvedIntegration> {
        let remaining = items.into_iter().skip(self.offset);
        match self.limit {
            Some(limit) => remaining.take(limit).collect(),
            None => remaining.collect(),
        }
    }
}

fn compare_by_key(key: SortKey, left: &ResolvedIntegration, right: &ResolvedIntegration) -> Ordering {
    let (a, b) = (&left.integration, &right.integration);
    match key {
        SortKey::Id => a.id().cmp(&b.id()),
        SortKey::Name => a.name().cmp(b.name()),
        SortKey::Section => a.section().cmp(b.section()),
        SortKey::Status => a.status().cmp(b.status()),
        SortKey::DisplayName => a.config().display_name().cmp(&b.config().display_name()),
        SortKey::IsDefault => left.is_default.cmp(&right.is_default),
        SortKey::CreatedAt => a.created_at().cmp(&b.created_at()),
        SortKey::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
    }
}

/// Applies the base ordering: defaults first, then section ascending, name
/// ascending and id descending.
pub fn order_defaults_first(items: &mut [ResolvedIntegration]) {
    items.sort_by(|left, right| {
        let (a, b) = (&left.integration, &right.integration);
        right
            .is_default
            .cmp(&left.is_default)
            .then_with(|| a.section().cmp(b.section()))
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| b.id().cmp(&a.id()))
    });
}

/// Partitions the list by section in order of first appearance, keeping
/// list order inside each group.
#[must_use]
pub fn group_by_section(items: Vec<ResolvedIntegration>) -> Vec<SectionGroup> {
    let mut groups: Vec<SectionGroup> = Vec::new();
    for item in items {
        let section = item.integration.section();
        if let Some(group) = groups.iter_mut().find(|group| &group.section == section) {
            group.integrations.push(item);
        } else {
            groups.push(SectionGroup {
                section: section.clone(),
                integrations: vec![item],
            });
        }
    }
    groups
}
