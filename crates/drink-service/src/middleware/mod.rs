//! Middleware for the drink service.
//!
//! # Components
//!
//! - `auth` - Per-route permission guard for protected routes
//! - `http_metrics` - HTTP request metrics middleware

pub mod auth;
pub mod http_metrics;

pub use auth::{guarded, require_permission, PermissionGuard};
pub use http_metrics::http_metrics_middleware;
