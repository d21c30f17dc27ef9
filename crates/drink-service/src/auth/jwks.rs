//! JWKS client for fetching public keys from the token issuer.
//!
//! The JWKS (JSON Web Key Set) client fetches public keys from the issuer's
//! `/.well-known/jwks.json` endpoint. By default every lookup fetches a fresh
//! key set; an optional bounded TTL cache can be enabled.
//!
//! # Security
//!
//! - Every fetch has a finite timeout so a slow issuer cannot stall requests
//! - Cached key sets are swapped as a whole; readers never see a partial set
//! - A kid missing from a fresh cache forces one refresh before rejecting,
//!   so rotated-in keys are usable immediately
//! - Cache TTL bounds how long a rotated-out key stays accepted

use crate::auth::error::AuthError;
use crate::observability::metrics;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::instrument;

/// JSON Web Key from the JWKS endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Jwk {
    /// Key type ("RSA" or "OKP").
    pub kty: String,

    /// Key ID - used to select the correct key for verification.
    #[serde(default)]
    pub kid: Option<String>,

    /// Key use (should be "sig" for signing).
    #[serde(default, rename = "use")]
    pub key_use: Option<String>,

    /// Algorithm the key is intended for, if the issuer publishes it.
    #[serde(default)]
    pub alg: Option<String>,

    /// RSA modulus (base64url).
    #[serde(default)]
    pub n: Option<String>,

    /// RSA public exponent (base64url).
    #[serde(default)]
    pub e: Option<String>,

    /// Curve name for OKP keys ("Ed25519").
    #[serde(default)]
    pub crv: Option<String>,

    /// OKP public key value (base64url).
    #[serde(default)]
    pub x: Option<String>,
}

/// JWKS document as published by the issuer.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksResponse {
    /// List of JSON Web Keys.
    pub keys: Vec<Jwk>,
}

/// Key set indexed by key ID.
///
/// Keys without a `kid` cannot be selected and are dropped. When several keys
/// share a `kid`, the last one published wins.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, Jwk>,
}

impl KeySet {
    /// Build a key set from the published key list.
    pub fn from_keys(keys: Vec<Jwk>) -> Self {
        let keys = keys
            .into_iter()
            .filter_map(|key| key.kid.clone().map(|kid| (kid, key)))
            .collect();
        Self { keys }
    }

    /// Look up a key by ID.
    pub fn get(&self, kid: &str) -> Option<&Jwk> {
        self.keys.get(kid)
    }

    /// Number of selectable keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set has no selectable keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Cached key set with expiry time.
struct CachedKeySet {
    key_set: Arc<KeySet>,
    expires_at: Instant,
}

/// JWKS client for fetching (and optionally caching) public keys.
pub struct JwksClient {
    /// URL to the JWKS endpoint.
    jwks_url: String,

    /// HTTP client for fetching JWKS.
    http_client: reqwest::Client,

    /// Per-request fetch timeout.
    fetch_timeout: Duration,

    /// Cached key set, only populated when `cache_ttl` is non-zero.
    cache: RwLock<Option<CachedKeySet>>,

    /// Cache TTL duration. Zero disables caching.
    cache_ttl: Duration,
}

impl JwksClient {
    /// Create a JWKS client that fetches a fresh key set on every lookup.
    ///
    /// # Arguments
    ///
    /// * `jwks_url` - URL to the issuer's JWKS endpoint
    /// * `fetch_timeout` - Upper bound on a single fetch
    pub fn new(jwks_url: String, fetch_timeout: Duration) -> Self {
        Self::with_cache_ttl(jwks_url, fetch_timeout, Duration::ZERO)
    }

    /// Create a JWKS client with a bounded cache TTL.
    ///
    /// A zero TTL disables caching.
    pub fn with_cache_ttl(jwks_url: String, fetch_timeout: Duration, cache_ttl: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(target: "drinks.auth.jwks", error = %e, "Failed to build HTTP client with custom config, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url,
            http_client,
            fetch_timeout,
            cache: RwLock::new(None),
            cache_ttl,
        }
    }

    /// URL of the JWKS endpoint.
    pub fn jwks_url(&self) -> &str {
        &self.jwks_url
    }

    /// Whether key sets are cached between lookups.
    pub fn caching_enabled(&self) -> bool {
        !self.cache_ttl.is_zero()
    }

    /// Get a JWK by key ID.
    ///
    /// # Errors
    ///
    /// - `KeySetUnavailable` if the key set cannot be fetched or parsed
    /// - `KeyNotFound` if no published key has this ID
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        if self.caching_enabled() {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.expires_at > Instant::now() {
                    if let Some(key) = cached.key_set.get(kid) {
                        tracing::debug!(target: "drinks.auth.jwks", "JWKS cache hit");
                        return Ok(key.clone());
                    }
                    tracing::debug!(target: "drinks.auth.jwks", "Key not in cached JWKS, refreshing");
                }
            }
        }

        let key_set = self.refresh().await?;

        key_set.get(kid).cloned().ok_or_else(|| {
            tracing::warn!(target: "drinks.auth.jwks", "Key not found in JWKS");
            AuthError::KeyNotFound
        })
    }

    /// Fetch the key set from the issuer, updating the cache when enabled.
    async fn refresh(&self) -> Result<Arc<KeySet>, AuthError> {
        let key_set = Arc::new(self.fetch_key_set().await?);

        if self.caching_enabled() {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedKeySet {
                key_set: Arc::clone(&key_set),
                expires_at: Instant::now() + self.cache_ttl,
            });
        }

        Ok(key_set)
    }

    /// Fetch and parse the current key set. Never consults the cache.
    ///
    /// # Errors
    ///
    /// Returns `KeySetUnavailable` on transport failure, non-2xx status,
    /// or an unparseable body.
    #[instrument(skip(self))]
    pub async fn fetch_key_set(&self) -> Result<KeySet, AuthError> {
        let start = Instant::now();
        let result = self.fetch_key_set_inner().await;
        let status = if result.is_ok() { "success" } else { "error" };
        metrics::record_jwks_fetch(status, start.elapsed());
        result
    }

    async fn fetch_key_set_inner(&self) -> Result<KeySet, AuthError> {
        tracing::debug!(target: "drinks.auth.jwks", url = %self.jwks_url, "Fetching JWKS");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(target: "drinks.auth.jwks", error = %e, "Failed to fetch JWKS");
                AuthError::KeySetUnavailable
            })?;

        if !response.status().is_success() {
            tracing::error!(
                target: "drinks.auth.jwks",
                status = %response.status(),
                "JWKS endpoint returned error"
            );
            return Err(AuthError::KeySetUnavailable);
        }

        let jwks: JwksResponse = response.json().await.map_err(|e| {
            tracing::error!(target: "drinks.auth.jwks", error = %e, "Failed to parse JWKS response");
            AuthError::KeySetUnavailable
        })?;

        let key_set = KeySet::from_keys(jwks.keys);

        tracing::debug!(
            target: "drinks.auth.jwks",
            key_count = key_set.len(),
            "JWKS fetched"
        );

        Ok(key_set)
    }

    /// Drop any cached key set.
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
    }
}
