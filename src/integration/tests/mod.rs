//! Unit tests for the integration module.
//!
//! Tests are organised by component: domain envelopes, the type catalog,
//! resolution, default-model selection and the mutation orchestrator.

mod support;
