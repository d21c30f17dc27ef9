//! Drink service configuration.
//!
//! Configuration is loaded once at startup from environment variables and
//! passed down explicitly; nothing reads the environment afterwards. The
//! database URL is redacted in Debug output.

use common::jwt::{is_supported_algorithm, DEFAULT_LEEWAY, MAX_LEEWAY};
use jsonwebtoken::Algorithm;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Default server bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

/// Default signing algorithm accepted for access tokens.
pub const DEFAULT_ALGORITHMS: &str = "RS256";

/// Default JWKS fetch timeout in seconds.
pub const DEFAULT_JWKS_FETCH_TIMEOUT_SECONDS: u64 = 10;

/// Maximum JWKS fetch timeout in seconds.
pub const MAX_JWKS_FETCH_TIMEOUT_SECONDS: u64 = 60;

/// Maximum JWKS cache TTL in seconds.
pub const MAX_JWKS_CACHE_TTL_SECONDS: u64 = 3600;

/// Default graceful shutdown drain period in seconds.
pub const DEFAULT_DRAIN_SECONDS: u64 = 5;

/// Token verification settings.
///
/// Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Issuer domain (e.g., "tenant.us.auth0.com").
    pub domain: String,

    /// Expected `aud` claim.
    pub audience: String,

    /// Expected `iss` claim (default: "https://<domain>/").
    pub issuer: String,

    /// JWKS endpoint (default: "https://<domain>/.well-known/jwks.json").
    pub jwks_url: String,

    /// Allowed signing algorithms.
    pub algorithms: Vec<Algorithm>,

    /// Upper bound on a single JWKS fetch.
    pub jwks_fetch_timeout: Duration,

    /// JWKS cache TTL. Zero fetches a fresh key set for every token.
    pub jwks_cache_ttl: Duration,

    /// Leeway in seconds for `exp`/`nbf` validation.
    pub leeway_seconds: u64,
}

/// Drink service configuration.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Server bind address (default: "0.0.0.0:8080").
    pub bind_address: String,

    /// Token verification settings.
    pub auth: AuthConfig,

    /// Graceful shutdown drain period in seconds.
    pub drain_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("auth", &self.auth)
            .field("drain_seconds", &self.drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid signing algorithm configuration: {0}")]
    InvalidAlgorithms(String),

    #[error("Invalid JWKS configuration: {0}")]
    InvalidJwks(String),

    #[error("Invalid JWT leeway configuration: {0}")]
    InvalidLeeway(String),

    #[error("Invalid drain period configuration: {0}")]
    InvalidDrain(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = required(vars, "DATABASE_URL")?;

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let auth = AuthConfig::from_vars(vars)?;

        let drain_seconds = parse_u64(vars, "DRAIN_SECONDS", DEFAULT_DRAIN_SECONDS)
            .map_err(ConfigError::InvalidDrain)?;

        Ok(Config {
            database_url,
            bind_address,
            auth,
            drain_seconds,
        })
    }
}

impl AuthConfig {
    /// Load token verification settings from a HashMap.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let domain = required(vars, "AUTH_DOMAIN")?;
        let audience = required(vars, "AUTH_AUDIENCE")?;

        let issuer = vars
            .get("AUTH_ISSUER")
            .cloned()
            .unwrap_or_else(|| format!("https://{}/", domain));

        let jwks_url = vars
            .get("AUTH_JWKS_URL")
            .cloned()
            .unwrap_or_else(|| format!("https://{}/.well-known/jwks.json", domain));

        let algorithms = parse_algorithms(
            vars.get("AUTH_ALGORITHMS")
                .map(String::as_str)
                .unwrap_or(DEFAULT_ALGORITHMS),
        )?;

        let fetch_timeout_seconds = parse_u64(
            vars,
            "JWKS_FETCH_TIMEOUT_SECONDS",
            DEFAULT_JWKS_FETCH_TIMEOUT_SECONDS,
        )
        .map_err(ConfigError::InvalidJwks)?;
        if fetch_timeout_seconds == 0 || fetch_timeout_seconds > MAX_JWKS_FETCH_TIMEOUT_SECONDS {
            return Err(ConfigError::InvalidJwks(format!(
                "JWKS_FETCH_TIMEOUT_SECONDS must be between 1 and {}, got {}",
                MAX_JWKS_FETCH_TIMEOUT_SECONDS, fetch_timeout_seconds
            )));
        }

        let cache_ttl_seconds =
            parse_u64(vars, "JWKS_CACHE_TTL_SECONDS", 0).map_err(ConfigError::InvalidJwks)?;
        if cache_ttl_seconds > MAX_JWKS_CACHE_TTL_SECONDS {
            return Err(ConfigError::InvalidJwks(format!(
                "JWKS_CACHE_TTL_SECONDS must not exceed {}, got {}",
                MAX_JWKS_CACHE_TTL_SECONDS, cache_ttl_seconds
            )));
        }

        let leeway_seconds = parse_u64(vars, "JWT_LEEWAY_SECONDS", DEFAULT_LEEWAY.as_secs())
            .map_err(ConfigError::InvalidLeeway)?;
        if leeway_seconds > MAX_LEEWAY.as_secs() {
            return Err(ConfigError::InvalidLeeway(format!(
                "JWT_LEEWAY_SECONDS must not exceed {} seconds, got {}",
                MAX_LEEWAY.as_secs(),
                leeway_seconds
            )));
        }

        Ok(AuthConfig {
            domain,
            audience,
            issuer,
            jwks_url,
            algorithms,
            jwks_fetch_timeout: Duration::from_secs(fetch_timeout_seconds),
            jwks_cache_ttl: Duration::from_secs(cache_ttl_seconds),
            leeway_seconds,
        })
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_u64(vars: &HashMap<String, String>, name: &str, default: u64) -> Result<u64, String> {
    match vars.get(name) {
        Some(value_str) => value_str.trim().parse().map_err(|e| {
            format!(
                "{} must be a valid non-negative integer, got '{}': {}",
                name, value_str, e
            )
        }),
        None => Ok(default),
    }
}

/// Parse a comma-separated algorithm list, rejecting symmetric algorithms.
fn parse_algorithms(value: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();

    for name in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let algorithm = Algorithm::from_str(name).map_err(|_| {
            ConfigError::InvalidAlgorithms(format!("unknown algorithm '{}'", name))
        })?;

        if !is_supported_algorithm(algorithm) {
            return Err(ConfigError::InvalidAlgorithms(format!(
                "algorithm '{}' cannot be verified with a public key set",
                name
            )));
        }

        if !algorithms.contains(&algorithm) {
            algorithms.push(algorithm);
        }
    }

    if algorithms.is_empty() {
        return Err(ConfigError::InvalidAlgorithms(
            "AUTH_ALGORITHMS must name at least one algorithm".to_string(),
        ));
    }

    Ok(algorithms)
}
