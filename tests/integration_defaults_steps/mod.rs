//! Step definitions for integration default scenarios.


mod then;
mod when;
