//! Authorization error taxonomy.
//!
//! Every failure in the authorization pipeline is one of these kinds. Each
//! kind carries a stable machine code, a human-readable description, and a
//! status category that the HTTP boundary maps to a status code.

use axum::http::StatusCode;
use thiserror::Error;

/// Coarse status category of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Caller could not be authenticated (401).
    Unauthorized,
    /// Request or issuer configuration is unusable (400).
    BadRequest,
    /// Caller is authenticated but lacks the permission (403).
    Forbidden,
    /// Upstream key set could not be obtained (503).
    Unavailable,
}

impl ErrorCategory {
    /// HTTP status code for this category.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorCategory::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCategory::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCategory::Forbidden => StatusCode::FORBIDDEN,
            ErrorCategory::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Classified authorization failure.
///
/// Constructed at the point of failure and propagated unchanged to the HTTP
/// boundary, except for verification failures which the gate collapses into
/// [`AuthError::InvalidOrUnverifiableToken`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authorization header is expected.")]
    MissingCredential,

    #[error("{0}")]
    MalformedCredential(&'static str),

    #[error("Unable to fetch signing keys.")]
    KeySetUnavailable,

    #[error("Unable to find the appropriate key.")]
    KeyNotFound,

    #[error("Token expired.")]
    TokenExpired,

    #[error("Incorrect claims. Please, check the audience and issuer.")]
    InvalidClaims,

    #[error("Unable to parse authentication token.")]
    TokenUnparsable,

    #[error("Permissions not included in token.")]
    PermissionsClaimMissing,

    #[error("Permission not granted.")]
    PermissionDenied,

    #[error("The access token is invalid or could not be verified.")]
    InvalidOrUnverifiableToken,
}

impl AuthError {
    /// Stable machine-readable code for clients.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "authorization_header_missing",
            AuthError::MalformedCredential(_) => "invalid_header",
            AuthError::KeySetUnavailable => "jwks_unavailable",
            AuthError::KeyNotFound => "key_not_found",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::TokenUnparsable => "token_unparsable",
            AuthError::PermissionsClaimMissing => "permissions_claim_missing",
            AuthError::PermissionDenied => "forbidden",
            AuthError::InvalidOrUnverifiableToken => "invalid_token",
        }
    }

    /// Status category for the HTTP boundary.
    ///
    /// `KeyNotFound` maps to bad request, not unauthorized.
    pub fn category(&self) -> ErrorCategory {
        match self {
            AuthError::MissingCredential
            | AuthError::MalformedCredential(_)
            | AuthError::TokenExpired
            | AuthError::InvalidClaims
            | AuthError::InvalidOrUnverifiableToken => ErrorCategory::Unauthorized,
            AuthError::KeyNotFound
            | AuthError::TokenUnparsable
            | AuthError::PermissionsClaimMissing => ErrorCategory::BadRequest,
            AuthError::PermissionDenied => ErrorCategory::Forbidden,
            AuthError::KeySetUnavailable => ErrorCategory::Unavailable,
        }
    }

    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.category().status_code()
    }
}
