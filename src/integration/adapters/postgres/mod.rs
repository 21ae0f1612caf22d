//! `PostgreSQL` adapter for integration persistence.

mod models;
mod repository;
mod schema;

pub use repository::{IntegrationPgPool, PostgresIntegrationStore};
