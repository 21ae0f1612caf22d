//! Integration registry and default resolution.
//!
//! Integrations are configured instances of a registered integration type.
//! Administration records live in a global scope and become visible to every
//! tenant when shared; project records belong to exactly one tenant. A
//! per-tenant default pointer designates the effective default instance for
//! each type name. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
