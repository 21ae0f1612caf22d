//! Integration registry: pluggable integration configuration across scopes.
//!
//! This crate keeps a catalog of integration types (cloud credentials, AI
//! model providers, ...) and manages their configured instances in two
//! scopes: a single administration scope whose records may be shared with
//! every tenant, and per-tenant project scopes. For any tenant it resolves
//! the effective merged, defaulted and secret-redacted view of those
//! configurations.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, vault, etc.)
//!
//! # Modules
//!
//! - [`integration`]: Type catalog, record store, default resolution and
//!   mutation orchestration

pub mod integration;
