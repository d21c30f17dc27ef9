//! Token verification and gate tests against a mocked JWKS endpoint.
//!
//! Exercises the verifier and gate directly so classified errors can be
//! asserted before the gate collapses them.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use drink_service::auth::{AuthError, AuthGate, JwksClient, TokenVerifier};
use drink_service::config::AuthConfig;
use drink_test_utils::*;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

fn auth_config(jwks_url: &str) -> AuthConfig {
    AuthConfig::from_vars(&HashMap::from([
        ("AUTH_DOMAIN".to_string(), TEST_AUTH_DOMAIN.to_string()),
        ("AUTH_AUDIENCE".to_string(), TEST_AUDIENCE.to_string()),
        ("AUTH_JWKS_URL".to_string(), jwks_url.to_string()),
        ("AUTH_ALGORITHMS".to_string(), "RS256,EdDSA".to_string()),
        ("JWKS_FETCH_TIMEOUT_SECONDS".to_string(), "2".to_string()),
    ]))
    .unwrap()
}

fn verifier(config: &AuthConfig) -> TokenVerifier {
    let client = Arc::new(JwksClient::new(
        config.jwks_url.clone(),
        config.jwks_fetch_timeout,
    ));
    TokenVerifier::new(client, config)
}

fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

#[tokio::test]
async fn test_valid_rs256_token_verifies() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = key.sign(
        &TestClaimsBuilder::new()
            .for_user("auth0|barista")
            .with_permissions(&["get:drinks-detail"])
            .build(),
    );

    let claims = verifier.verify(&token).await.unwrap();
    assert_eq!(claims.sub(), Some("auth0|barista"));
    assert_eq!(claims.permissions(), vec!["get:drinks-detail"]);
}

#[tokio::test]
async fn test_valid_eddsa_token_verifies() {
    let key = Ed25519TestKey::new(7, "ed-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = key.sign(&TestClaimsBuilder::new().build());

    assert!(verifier.verify(&token).await.is_ok());
}

#[tokio::test]
async fn test_verification_is_idempotent() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));
    let token = key.sign(&TestClaimsBuilder::new().build());

    let first = verifier.verify(&token).await.unwrap();
    let second = verifier.verify(&token).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(jwks.fetch_count().await, 2);
}

#[tokio::test]
async fn test_unknown_kid_is_key_not_found() {
    let published = RsaTestKey::new("rsa-key-01");
    let signer = RsaTestKey::new("rsa-key-rotated");
    let jwks = MockJwksServer::start(vec![published.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = signer.sign(&TestClaimsBuilder::new().build());

    assert_eq!(verifier.verify(&token).await, Err(AuthError::KeyNotFound));
}

#[tokio::test]
async fn test_expired_token_is_token_expired() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = key.sign(&TestClaimsBuilder::new().expires_in(-3600).build());

    assert_eq!(verifier.verify(&token).await, Err(AuthError::TokenExpired));
}

#[tokio::test]
async fn test_expiry_within_leeway_is_accepted() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = key.sign(&TestClaimsBuilder::new().expires_in(-10).build());

    assert!(verifier.verify(&token).await.is_ok());
}

#[tokio::test]
async fn test_wrong_audience_is_invalid_claims() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = key.sign(&TestClaimsBuilder::new().with_audience("other-api").build());

    assert_eq!(verifier.verify(&token).await, Err(AuthError::InvalidClaims));
}

#[tokio::test]
async fn test_wrong_issuer_is_invalid_claims() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = key.sign(
        &TestClaimsBuilder::new()
            .with_issuer("https://evil.example.com/")
            .build(),
    );

    assert_eq!(verifier.verify(&token).await, Err(AuthError::InvalidClaims));
}

#[tokio::test]
async fn test_missing_audience_is_invalid_claims() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = key.sign(&TestClaimsBuilder::new().without_claim("aud").build());

    assert_eq!(verifier.verify(&token).await, Err(AuthError::InvalidClaims));
}

#[tokio::test]
async fn test_garbage_signature_is_token_unparsable() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    // Expired and wrongly addressed as well: signature failure must win.
    let token = key.sign(
        &TestClaimsBuilder::new()
            .expires_in(-3600)
            .with_audience("other-api")
            .build(),
    );

    assert_eq!(
        verifier.verify(&tamper_signature(&token)).await,
        Err(AuthError::TokenUnparsable)
    );
}

#[tokio::test]
async fn test_signature_from_other_key_with_same_kid_is_unparsable() {
    let published = Ed25519TestKey::new(1, "ed-key-01");
    let impostor = Ed25519TestKey::new(2, "ed-key-01");
    let jwks = MockJwksServer::start(vec![published.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = impostor.sign(&TestClaimsBuilder::new().build());

    assert_eq!(verifier.verify(&token).await, Err(AuthError::TokenUnparsable));
}

#[tokio::test]
async fn test_unsigned_token_is_rejected() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","kid":"rsa-key-01","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(TestClaimsBuilder::new().build().to_string());
    let token = format!("{header}.{payload}.");

    assert!(verifier.verify(&token).await.is_err());
}

#[tokio::test]
async fn test_token_without_kid_is_malformed() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"alice"}"#);
    let token = format!("{header}.{payload}.c2ln");

    assert!(matches!(
        verifier.verify(&token).await,
        Err(AuthError::MalformedCredential(_))
    ));
    assert_eq!(jwks.fetch_count().await, 0);
}

#[tokio::test]
async fn test_unreachable_key_set_is_unavailable() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start_failing(503).await;
    let verifier = verifier(&auth_config(&jwks.jwks_url()));

    let token = key.sign(&TestClaimsBuilder::new().build());

    assert_eq!(
        verifier.verify(&token).await,
        Err(AuthError::KeySetUnavailable)
    );
}

// ============================================================================
// Gate
// ============================================================================

#[tokio::test]
async fn test_gate_grants_and_forwards_claims_unmodified() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let gate = AuthGate::from_config(&auth_config(&jwks.jwks_url()));

    let raw = TestClaimsBuilder::new()
        .with_permissions(&["post:drinks", "patch:drinks"])
        .with_claim("https://coffee.example.com/roles", json!(["barista"]))
        .build();
    let token = key.sign(&raw);

    let claims = gate.authorize("post:drinks", &bearer(&token)).await.unwrap();

    assert_eq!(serde_json::to_value(&claims).unwrap(), raw);
}

#[tokio::test]
async fn test_gate_missing_permissions_claim() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let gate = AuthGate::from_config(&auth_config(&jwks.jwks_url()));

    let token = key.sign(&TestClaimsBuilder::new().without_permissions().build());

    assert_eq!(
        gate.authorize("post:drinks", &bearer(&token)).await,
        Err(AuthError::PermissionsClaimMissing)
    );
}

#[tokio::test]
async fn test_gate_permission_denied() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let gate = AuthGate::from_config(&auth_config(&jwks.jwks_url()));

    let token = key.sign(
        &TestClaimsBuilder::new()
            .with_permissions(&["get:drinks-detail"])
            .build(),
    );

    assert_eq!(
        gate.authorize("delete:drinks", &bearer(&token)).await,
        Err(AuthError::PermissionDenied)
    );
}

#[tokio::test]
async fn test_gate_collapses_verification_failures() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let gate = AuthGate::from_config(&auth_config(&jwks.jwks_url()));

    let expired = key.sign(&TestClaimsBuilder::new().expires_in(-3600).build());
    let unknown_kid = RsaTestKey::new("other").sign(&TestClaimsBuilder::new().build());

    for token in [expired, unknown_kid] {
        assert_eq!(
            gate.authorize("post:drinks", &bearer(&token)).await,
            Err(AuthError::InvalidOrUnverifiableToken)
        );
    }
}

#[tokio::test]
async fn test_gate_missing_header_makes_no_fetch() {
    let key = RsaTestKey::new("rsa-key-01");
    let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
    let gate = AuthGate::from_config(&auth_config(&jwks.jwks_url()));

    assert_eq!(
        gate.authorize("post:drinks", &HeaderMap::new()).await,
        Err(AuthError::MissingCredential)
    );
    assert_eq!(jwks.fetch_count().await, 0);
}
