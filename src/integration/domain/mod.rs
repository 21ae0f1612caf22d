//! Domain model for integration records, default pointers and resolution
//! results.
//!
//! Records are owned either by the administration scope or by a single
//! tenant. Settings and config are opaque JSON objects behind typed
//! envelopes that expose only the fields the registry itself inspects.

mod config;
mod error;
mod event;
mod ids;
mod integration;
mod name;
mod pointer;
mod resolved;
mod scope;
mod section;
mod settings;
mod validation;

pub use config::IntegrationConfig;
pub use error::IntegrationDomainError;
pub use event::{IntegrationEvent, IntegrationEventEnvelope, created_or_updated_event_name};
pub use ids::{IntegrationId, IntegrationRef, IntegrationUid, PointerId, ProjectId};
pub use integration::{DEFAULT_STATUS, Integration, NewIntegration, PersistedIntegrationData};
pub use name::{IntegrationName, SectionName};
pub use pointer::DefaultPointer;
pub use resolved::{Resolution, ResolvedIntegration, SectionGroup};
pub use scope::Scope;
pub use section::SectionDescriptor;
pub use settings::{IntegrationSettings, ModelEntry, SecretField};
pub use validation::{FieldViolation, ValidationErrors};
