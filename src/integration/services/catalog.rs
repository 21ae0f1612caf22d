//! Registry of integration types and the sections that group them.
//!
//! The catalog is built at startup and shared behind an `Arc`. Every read and
//! write of integration records is gated on catalog membership: rows whose
//! type is not registered are treated as absent.

use crate::integration::{
    domain::{IntegrationDomainError, IntegrationName, SectionDescriptor, SectionName},
    ports::SettingsSchema,
};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::{debug, info};

/// Catalog entry describing an integration type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// Normalized type name.
    pub name: IntegrationName,
    /// Section the type belongs to.
    pub section: SectionName,
    /// Schema applied to update payloads.
    pub validate_schema: Arc<dyn SettingsSchema>,
    /// Schema applied to create payloads.
    pub create_schema: Arc<dyn SettingsSchema>,
}

/// Request payload for registering an integration type.
#[derive(Debug, Clone)]
pub struct RegisterTypeRequest {
    name: String,
    section: String,
    validate_schema: Arc<dyn SettingsSchema>,
    create_schema: Option<Arc<dyn SettingsSchema>>,
}

impl RegisterTypeRequest {
    /// Creates a request whose create schema equals its validate schema.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        section: impl Into<String>,
        validate_schema: Arc<dyn SettingsSchema>,
    ) -> Self {
        Self {
            name: name.into(),
            section: section.into(),
            validate_schema,
            create_schema: None,
        }
    }

    /// Uses a distinct schema for create payloads.
    #[must_use]
    pub fn with_create_schema(mut self, schema: Arc<dyn SettingsSchema>) -> Self {
        self.create_schema = Some(schema);
        self
    }
}

/// Request payload for registering a section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionRegistration {
    name: String,
    integration_description: String,
    test_planner_description: String,
}

impl SectionRegistration {
    /// Creates a request with empty descriptions.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the integration description.
    #[must_use]
    pub fn with_integration_description(mut self, description: impl Into<String>) -> Self {
        self.integration_description = description.into();
        self
    }

    /// Sets the test planner description.
    #[must_use]
    pub fn with_test_planner_description(mut self, description: impl Into<String>) -> Self {
        self.test_planner_description = description.into();
        self
    }
}

/// Errors returned by catalog registration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The type or section name is invalid.
    #[error(transparent)]
    InvalidName(#[from] IntegrationDomainError),
}

#[derive(Debug, Default)]
struct CatalogState {
    types: BTreeMap<IntegrationName, TypeDescriptor>,
    sections: BTreeMap<SectionName, SectionDescriptor>,
}

/// Thread-safe type and section registry.
///
/// Writers are serialized; readers observe a consistent snapshot. A
/// registration for an existing type name replaces the previous entry.
#[derive(Debug, Default)]
pub struct IntegrationCatalog {
    state: RwLock<CatalogState>,
}

impl IntegrationCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers an integration type, replacing any previous registration
    /// of the same name.
    ///
    /// A section that is not registered yet is registered bare.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidName`] when the type or section name
    /// fails validation.
    pub fn register(&self, request: RegisterTypeRequest) -> Result<TypeDescriptor, CatalogError> {
        let RegisterTypeRequest {
            name,
            section,
            validate_schema,
            create_schema,
        } = request;

        let type_name = IntegrationName::new(name)?;
        let section_name = SectionName::new(section)?;
        let descriptor = TypeDescriptor {
            name: type_name.clone(),
            section: section_name.clone(),
            create_schema: create_schema.unwrap_or_else(|| Arc::clone(&validate_schema)),
            validate_schema,
        };

        let mut state = self.write();
        state
            .sections
            .entry(section_name.clone())
            .or_insert_with(|| SectionDescriptor::bare(section_name.clone()));
        let replaced = state
            .types
            .insert(type_name.clone(), descriptor.clone())
            .is_some();
        drop(state);

        info!(
            integration = %type_name,
            section = %section_name,
            replaced,
            "registered integration type"
        );
        Ok(descriptor)
    }

    /// Registers a section.
    ///
    /// An existing section is returned untouched unless `force_overwrite`
    /// is set.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidName`] when the section name fails
    /// validation.
    pub fn register_section(
        &self,
        registration: SectionRegistration,
        force_overwrite: bool,
    ) -> Result<SectionDescriptor, CatalogError> {
        let SectionRegistration {
            name,
            integration_description,
            test_planner_description,
        } = registration;
        let section_name = SectionName::new(name)?;

        let mut state = self.write();
        if !force_overwrite && let Some(existing) = state.sections.get(&section_name) {
            debug!(section = %section_name, "section already registered");
            return Ok(existing.clone());
        }
        let descriptor = SectionDescriptor {
            name: section_name.clone(),
            integration_description,
            test_planner_description,
        };
        state.sections.insert(section_name, descriptor.clone());
        Ok(descriptor)
    }

    /// Looks up a type by raw name. Invalid names are simply absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<TypeDescriptor> {
        let type_name = IntegrationName::new(name).ok()?;
        self.get_by_name(&type_name)
    }

    /// Looks up a type by validated name.
    #[must_use]
    pub fn get_by_name(&self, name: &IntegrationName) -> Option<TypeDescriptor> {
        self.read().types.get(name).cloned()
    }

    /// Looks up a section by raw name.
    #[must_use]
    pub fn get_section(&self, name: &str) -> Option<SectionDescriptor> {
        let section_name = SectionName::new(name).ok()?;
        self.read().sections.get(&section_name).cloned()
    }

    /// Returns every section in name order.
    #[must_use]
    pub fn sections(&self) -> Vec<SectionDescriptor> {
        self.read().sections.values().cloned().collect()
    }

    /// Returns every type in name order.
    #[must_use]
    pub fn types(&self) -> Vec<TypeDescriptor> {
        self.read().types.values().cloned().collect()
    }

    /// Returns the types of one section in name order.
    #[must_use]
    pub fn types_in_section(&self, section: &str) -> Vec<TypeDescriptor> {
        let Ok(section_name) = SectionName::new(section) else {
            return Vec::new();
        };
        self.read()
            .types
            .values()
            .filter(|descriptor| descriptor.section == section_name)
            .cloned()
            .collect()
    }

    /// Returns `true` when a type with this raw name is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns `true` when the validated type name is registered.
    #[must_use]
    pub fn contains(&self, name: &IntegrationName) -> bool {
        self.read().types.contains_key(name)
    }

    /// Returns `true` when a section with this raw name is registered.
    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        SectionName::new(name).is_ok_and(|section| self.read().sections.contains_key(&section))
    }
}
