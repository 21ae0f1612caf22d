//! Adapter implementations for integration ports.

pub mod memory;
pub mod postgres;
pub mod schema;
