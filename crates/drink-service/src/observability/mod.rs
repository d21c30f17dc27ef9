//! Observability for the drink service.
//!
//! Provides metrics definitions and recording helpers.

pub mod metrics;
