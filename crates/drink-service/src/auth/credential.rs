//! Bearer credential extraction.
//!
//! Pulls the raw token out of the `Authorization` header. The token itself is
//! not decoded here; shape checks on the JWT happen in the verifier.

use crate::auth::error::AuthError;
use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Extract the bearer token from request headers.
///
/// Accepts exactly `<scheme> <token>` where the scheme is case-insensitively
/// `bearer`, separated by any run of whitespace.
///
/// # Errors
///
/// - `MissingCredential` if the header is absent or empty
/// - `MalformedCredential` for any other shape
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        tracing::debug!(target: "drinks.auth.credential", "Missing Authorization header");
        return Err(AuthError::MissingCredential);
    };

    if value.is_empty() {
        tracing::debug!(target: "drinks.auth.credential", "Empty Authorization header");
        return Err(AuthError::MissingCredential);
    }

    let header = value.to_str().map_err(|_| {
        tracing::debug!(target: "drinks.auth.credential", "Authorization header is not visible ASCII");
        AuthError::MalformedCredential("Authorization header must be bearer token.")
    })?;

    let mut parts = header.split_whitespace();

    match parts.next() {
        Some(scheme) if scheme.eq_ignore_ascii_case("bearer") => {}
        _ => {
            tracing::debug!(target: "drinks.auth.credential", "Authorization scheme is not bearer");
            return Err(AuthError::MalformedCredential(
                "Authorization header must start with \"Bearer\".",
            ));
        }
    }

    let Some(token) = parts.next() else {
        tracing::debug!(target: "drinks.auth.credential", "Bearer token missing");
        return Err(AuthError::MalformedCredential("Token not found."));
    };

    if parts.next().is_some() {
        tracing::debug!(target: "drinks.auth.credential", "Authorization header has extra segments");
        return Err(AuthError::MalformedCredential(
            "Authorization header must be bearer token.",
        ));
    }

    Ok(token)
}
