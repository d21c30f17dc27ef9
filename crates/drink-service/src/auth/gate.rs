//! Authorization gate.
//!
//! Composes credential extraction, token verification and permission
//! enforcement into the single check run before every protected operation.

use crate::auth::claims::Claims;
use crate::auth::credential::extract_bearer_token;
use crate::auth::error::AuthError;
use crate::auth::jwks::JwksClient;
use crate::auth::jwt::TokenVerifier;
use crate::auth::permissions::check_permissions;
use crate::config::AuthConfig;
use crate::observability::metrics;
use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::instrument;

/// Guard combining authentication and permission checks.
pub struct AuthGate {
    verifier: TokenVerifier,
}

impl AuthGate {
    /// Create a gate around an existing verifier.
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Build the gate and its JWKS client from configuration.
    pub fn from_config(config: &AuthConfig) -> Self {
        let jwks_client = Arc::new(JwksClient::with_cache_ttl(
            config.jwks_url.clone(),
            config.jwks_fetch_timeout,
            config.jwks_cache_ttl,
        ));
        Self::new(TokenVerifier::new(jwks_client, config))
    }

    /// Authorize a request for `permission` and return the verified claims.
    ///
    /// Verification failures of any kind surface as
    /// `InvalidOrUnverifiableToken` so key-matching details never reach the
    /// caller. Extraction and permission failures pass through unchanged.
    ///
    /// # Errors
    ///
    /// - `MissingCredential` / `MalformedCredential` from header extraction
    /// - `InvalidOrUnverifiableToken` if the token cannot be verified
    /// - `PermissionsClaimMissing` / `PermissionDenied` from the permission check
    #[instrument(skip(self, headers), name = "drinks.auth.gate")]
    pub async fn authorize(&self, permission: &str, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let result = self.authorize_inner(permission, headers).await;

        let outcome = match &result {
            Ok(_) => "granted",
            Err(e) => e.code(),
        };
        metrics::record_auth_decision(permission, outcome);

        result
    }

    async fn authorize_inner(&self, permission: &str, headers: &HeaderMap) -> Result<Claims, AuthError> {
        let token = extract_bearer_token(headers)?;

        let claims = self.verifier.verify(token).await.map_err(|e| {
            tracing::debug!(
                target: "drinks.auth.gate",
                error_code = e.code(),
                "Token verification failed"
            );
            AuthError::InvalidOrUnverifiableToken
        })?;

        check_permissions(permission, &claims)?;

        tracing::debug!(target: "drinks.auth.gate", "Request authorized");
        Ok(claims)
    }
}
