//! JWT utilities shared across coffee shop services.
//!
//! This module provides the token-shape checks that run before any key lookup
//! or signature verification:
//! - Size limits for DoS prevention
//! - Leeway constants for time-based claim validation
//! - Key ID extraction from the unverified JWT header
//! - Key-type/algorithm compatibility for JWK material
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Nothing returned here is trusted; the token MUST still be verified
//! - Error messages are generic to prevent information leakage
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{extract_kid, algorithm_matches_key_type};
//!
//! let kid = extract_kid(token)?;
//! let jwk = key_set.find(&kid)?;
//! if !algorithm_matches_key_type(Algorithm::RS256, &jwk.kty) {
//!     return Err(...);
//! }
//! ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::Algorithm;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// JWTs larger than this size are rejected BEFORE any parsing or cryptographic
/// operations.
///
/// - Typical access tokens are 500-1500 bytes (RS256 signature, permissions list)
/// - 8KB allows a long permissions claim while bounding decode work
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Default leeway applied to `exp`/`nbf` validation.
///
/// Matches the `jsonwebtoken` default and absorbs clock drift between the
/// token issuer and this service.
pub const DEFAULT_LEEWAY: Duration = Duration::from_secs(60);

/// Maximum allowed leeway (10 minutes).
///
/// Prevents misconfiguration that would keep expired tokens usable for long.
pub const MAX_LEEWAY: Duration = Duration::from_secs(600);

/// JWK key type for RSA keys (`n`/`e` components).
pub const KEY_TYPE_RSA: &str = "RSA";

/// JWK key type for octet key pairs (Ed25519, `x` component).
pub const KEY_TYPE_OKP: &str = "OKP";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while inspecting an unverified JWT.
///
/// Note: Error messages are intentionally generic to prevent information leakage.
/// Detailed information is logged at debug level for troubleshooting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid or expired")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure).
    #[error("The access token is invalid or expired")]
    MalformedToken,

    /// Token is missing required `kid` header.
    #[error("The access token is invalid or expired")]
    MissingKid,
}

// =============================================================================
// Functions
// =============================================================================

/// Reject tokens larger than [`MAX_JWT_SIZE_BYTES`].
///
/// # Errors
///
/// Returns `JwtValidationError::TokenTooLarge` if the token exceeds the limit.
pub fn check_token_size(token: &str) -> Result<(), JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }
    Ok(())
}

/// Extract the `kid` (key ID) from a JWT header without verifying the signature.
///
/// This is used to look up the correct signing key in the issuer's key set.
///
/// # Security
///
/// - Token size is checked BEFORE any parsing (denial-of-service prevention)
/// - This function does NOT validate the token signature
/// - The `kid` value should only be used for key lookup in a trusted JWKS
///
/// # Errors
///
/// Returns `JwtValidationError` variants:
/// - `TokenTooLarge` - Token exceeds size limit
/// - `MalformedToken` - Token format invalid (wrong structure, bad base64, invalid JSON)
/// - `MissingKid` - Token header missing `kid` field, `kid` is not a string, or is empty
pub fn extract_kid(token: &str) -> Result<String, JwtValidationError> {
    check_token_size(token)?;

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        tracing::debug!(
            target: "common.jwt",
            parts = parts.len(),
            "Token rejected: invalid JWT format"
        );
        return Err(JwtValidationError::MalformedToken);
    }

    let header_part = parts.first().ok_or(JwtValidationError::MalformedToken)?;
    let header_bytes = URL_SAFE_NO_PAD.decode(header_part).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to decode JWT header base64");
        JwtValidationError::MalformedToken
    })?;

    let header: serde_json::Value = serde_json::from_slice(&header_bytes).map_err(|e| {
        tracing::debug!(target: "common.jwt", error = %e, "Failed to parse JWT header JSON");
        JwtValidationError::MalformedToken
    })?;

    let kid = header
        .get("kid")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .ok_or(JwtValidationError::MissingKid)?;

    Ok(kid)
}

/// Whether `algorithm` can be verified with a JWK of key type `kty`.
///
/// HMAC algorithms never match: a public key set cannot carry shared secrets.
#[must_use]
pub fn algorithm_matches_key_type(algorithm: Algorithm, kty: &str) -> bool {
    match algorithm {
        Algorithm::RS256
        | Algorithm::RS384
        | Algorithm::RS512
        | Algorithm::PS256
        | Algorithm::PS384
        | Algorithm::PS512 => kty == KEY_TYPE_RSA,
        Algorithm::EdDSA => kty == KEY_TYPE_OKP,
        Algorithm::HS256
        | Algorithm::HS384
        | Algorithm::HS512
        | Algorithm::ES256
        | Algorithm::ES384 => false,
    }
}

/// Whether `algorithm` is asymmetric and verifiable from a published key set.
#[must_use]
pub fn is_supported_algorithm(algorithm: Algorithm) -> bool {
    algorithm_matches_key_type(algorithm, KEY_TYPE_RSA)
        || algorithm_matches_key_type(algorithm, KEY_TYPE_OKP)
}

// =============================================================================
// Tests
// =============================================================================
