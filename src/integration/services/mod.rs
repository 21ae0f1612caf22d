//! Application services: the type catalog, the resolution engine and the
//! mutation orchestrator.

mod catalog;
mod config;
mod error;
mod model_defaults;
mod orchestrator;
mod ordering;
mod resolution;

pub use catalog::{
    CatalogError, IntegrationCatalog, RegisterTypeRequest, SectionRegistration, TypeDescriptor,
};
pub use config::{OrchestratorConfig, ResolverConfig};
pub use error::{IntegrationServiceError, IntegrationServiceResult};
pub use model_defaults::{DefaultModelPointer, mark_default_models};
pub use orchestrator::{IntegrationOrchestrator, IntegrationPayload};
pub use ordering::{PageSpec, SortKey, SortOrder, SortSpec, group_by_section, order_defaults_first};
pub use resolution::{IntegrationResolver, ResolveFilter, ResolveQuery};
