//! Authentication and authorization for the drink service.
//!
//! Verifies bearer JWTs against the issuer's JWKS endpoint and enforces
//! per-route permission strings.
//!
//! # Components
//!
//! - `credential` - Bearer token extraction from the Authorization header
//! - `jwks` - JWKS client for fetching (and optionally caching) public keys
//! - `jwt` - Token verification (signature, expiry, audience, issuer)
//! - `permissions` - Permission membership checks on verified claims
//! - `gate` - Composition of the above into one guard
//! - `claims` - Verified claim set
//! - `error` - Classified authorization errors

pub mod claims;
pub mod credential;
pub mod error;
pub mod gate;
pub mod jwks;
pub mod jwt;
pub mod permissions;

pub use claims::Claims;
pub use error::{AuthError, ErrorCategory};
pub use gate::AuthGate;
pub use jwks::JwksClient;
pub use jwt::TokenVerifier;
