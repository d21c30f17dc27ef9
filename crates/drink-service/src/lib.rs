//! Drink Service Library
//!
//! Coffee shop drink menu API. Public routes list drinks; every other
//! operation requires a bearer JWT issued by the configured identity
//! provider and carrying the route's permission string.
//!
//! This library exposes the service modules for integration testing and the
//! test server harness.

pub mod auth;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
