//! JWT verification against the issuer's published keys.
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only asymmetric algorithms from the configured allow-list are accepted,
//!   further narrowed to those matching the selected key's type
//! - `exp`, `aud` and `iss` are required and checked
//! - Failures are classified so expired, untrusted and garbage tokens can be
//!   told apart by callers

use crate::auth::claims::Claims;
use crate::auth::error::AuthError;
use crate::auth::jwks::{Jwk, JwksClient};
use crate::config::AuthConfig;
use crate::observability::metrics;
use common::jwt::{
    algorithm_matches_key_type, check_token_size, extract_kid, JwtValidationError, KEY_TYPE_OKP,
    KEY_TYPE_RSA,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

/// Token verifier using keys from the issuer's JWKS.
pub struct TokenVerifier {
    /// JWKS client for fetching public keys.
    jwks_client: Arc<JwksClient>,

    /// Expected `aud` claim.
    audience: String,

    /// Expected `iss` claim.
    issuer: String,

    /// Allowed signing algorithms.
    algorithms: Vec<Algorithm>,

    /// Leeway in seconds for `exp`/`nbf`.
    leeway_seconds: u64,
}

impl TokenVerifier {
    /// Create a verifier for the configured issuer and audience.
    pub fn new(jwks_client: Arc<JwksClient>, config: &AuthConfig) -> Self {
        Self {
            jwks_client,
            audience: config.audience.clone(),
            issuer: config.issuer.clone(),
            algorithms: config.algorithms.clone(),
            leeway_seconds: config.leeway_seconds,
        }
    }

    /// Verify a bare token and return its claims.
    ///
    /// # Steps
    ///
    /// 1. Size check and `kid` extraction from the unverified header
    /// 2. Key lookup in the issuer's key set
    /// 3. Signature, `exp`, `aud` and `iss` validation
    ///
    /// # Errors
    ///
    /// - `MalformedCredential` if the header is unreadable or has no `kid`
    /// - `KeySetUnavailable` / `KeyNotFound` from the key lookup
    /// - `TokenExpired`, `InvalidClaims`, `TokenUnparsable` from validation
    #[instrument(skip_all, name = "drinks.auth.verify")]
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let result = self.verify_inner(token).await;
        if let Err(e) = &result {
            metrics::record_token_verification_failure(e.code());
        }
        result
    }

    async fn verify_inner(&self, token: &str) -> Result<Claims, AuthError> {
        check_token_size(token).map_err(|_| AuthError::TokenUnparsable)?;

        let kid = extract_kid(token).map_err(|e| {
            tracing::debug!(target: "drinks.auth.jwt", error = ?e, "Token kid extraction failed");
            match e {
                JwtValidationError::TokenTooLarge => AuthError::TokenUnparsable,
                JwtValidationError::MalformedToken | JwtValidationError::MissingKid => {
                    AuthError::MalformedCredential("Authorization malformed.")
                }
            }
        })?;

        let jwk = self.jwks_client.get_key(&kid).await?;

        let claims = self.verify_with_key(token, &jwk)?;

        tracing::debug!(target: "drinks.auth.jwt", "Token verified successfully");
        Ok(claims)
    }

    /// Verify signature and standard claims with an already selected key.
    fn verify_with_key(&self, token: &str, jwk: &Jwk) -> Result<Claims, AuthError> {
        let algorithms = self.algorithms_for_key(jwk)?;
        let decoding_key = decoding_key(jwk)?;

        let mut validation = Validation::new(*algorithms.first().ok_or(AuthError::TokenUnparsable)?);
        validation.algorithms = algorithms;
        validation.leeway = self.leeway_seconds;
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        let token_data =
            decode::<Map<String, Value>>(token, &decoding_key, &validation).map_err(|e| {
                tracing::debug!(target: "drinks.auth.jwt", error = %e, "Token verification failed");
                classify_decode_error(e.kind())
            })?;

        Ok(Claims::new(token_data.claims))
    }

    /// Allowed algorithms usable with this key.
    ///
    /// A key that names its own `alg` restricts verification to exactly that
    /// algorithm, and only if it is also allowed by configuration.
    fn algorithms_for_key(&self, jwk: &Jwk) -> Result<Vec<Algorithm>, AuthError> {
        if jwk.key_use.as_deref().is_some_and(|u| u != "sig") {
            tracing::warn!(target: "drinks.auth.jwt", key_use = ?jwk.key_use, "JWK is not a signing key");
            return Err(AuthError::TokenUnparsable);
        }

        let mut algorithms: Vec<Algorithm> = self
            .algorithms
            .iter()
            .copied()
            .filter(|alg| algorithm_matches_key_type(*alg, &jwk.kty))
            .collect();

        if let Some(alg) = &jwk.alg {
            let published = Algorithm::from_str(alg).map_err(|_| {
                tracing::warn!(target: "drinks.auth.jwt", alg = %alg, "JWK names an unknown algorithm");
                AuthError::TokenUnparsable
            })?;
            algorithms.retain(|a| *a == published);
        }

        if algorithms.is_empty() {
            tracing::warn!(
                target: "drinks.auth.jwt",
                kty = %jwk.kty,
                alg = ?jwk.alg,
                "No allowed algorithm matches the JWK"
            );
            return Err(AuthError::TokenUnparsable);
        }

        Ok(algorithms)
    }
}

/// Build a decoding key from JWK components.
fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    let result = match jwk.kty.as_str() {
        KEY_TYPE_RSA => {
            let (Some(n), Some(e)) = (&jwk.n, &jwk.e) else {
                tracing::error!(target: "drinks.auth.jwt", "RSA JWK missing n or e");
                return Err(AuthError::TokenUnparsable);
            };
            DecodingKey::from_rsa_components(n, e)
        }
        KEY_TYPE_OKP => {
            if jwk.crv.as_deref().is_some_and(|crv| crv != "Ed25519") {
                tracing::error!(target: "drinks.auth.jwt", crv = ?jwk.crv, "Unsupported OKP curve");
                return Err(AuthError::TokenUnparsable);
            }
            let Some(x) = &jwk.x else {
                tracing::error!(target: "drinks.auth.jwt", "OKP JWK missing x");
                return Err(AuthError::TokenUnparsable);
            };
            DecodingKey::from_ed_components(x)
        }
        other => {
            tracing::warn!(target: "drinks.auth.jwt", kty = %other, "Unsupported JWK key type");
            return Err(AuthError::TokenUnparsable);
        }
    };

    result.map_err(|e| {
        tracing::error!(target: "drinks.auth.jwt", error = %e, "Invalid JWK key material");
        AuthError::TokenUnparsable
    })
}

/// Map a `jsonwebtoken` failure onto the auth error taxonomy.
fn classify_decode_error(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::InvalidClaims,
        ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
            AuthError::InvalidClaims
        }
        _ => AuthError::TokenUnparsable,
    }
}
