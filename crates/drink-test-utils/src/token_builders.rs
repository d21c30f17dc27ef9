//! Builder for test JWT claims.

use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

/// Issuer domain used by the test harness.
pub const TEST_AUTH_DOMAIN: &str = "test-issuer.example.com";

/// Issuer (`iss`) expected by the test harness.
pub const TEST_ISSUER: &str = "https://test-issuer.example.com/";

/// Audience (`aud`) expected by the test harness.
pub const TEST_AUDIENCE: &str = "coffeeshop";

/// Builder for creating test JWT claims.
///
/// Defaults to a token valid for one hour with the harness issuer and
/// audience and an empty permissions list.
///
/// # Example
/// ```rust,ignore
/// let claims = TestClaimsBuilder::new()
///     .for_user("auth0|barista")
///     .with_permissions(&["get:drinks-detail", "post:drinks"])
///     .build();
/// ```
pub struct TestClaimsBuilder {
    claims: Map<String, Value>,
}

impl TestClaimsBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        let mut claims = Map::new();
        claims.insert("sub".to_string(), json!("auth0|test-user"));
        claims.insert("iss".to_string(), json!(TEST_ISSUER));
        claims.insert("aud".to_string(), json!(TEST_AUDIENCE));
        claims.insert("iat".to_string(), json!(now.timestamp()));
        claims.insert(
            "exp".to_string(),
            json!((now + Duration::seconds(3600)).timestamp()),
        );
        claims.insert("permissions".to_string(), json!([]));
        Self { claims }
    }

    /// Set the subject.
    pub fn for_user(self, subject: &str) -> Self {
        self.with_claim("sub", json!(subject))
    }

    pub fn with_audience(self, audience: &str) -> Self {
        self.with_claim("aud", json!(audience))
    }

    pub fn with_issuer(self, issuer: &str) -> Self {
        self.with_claim("iss", json!(issuer))
    }

    /// Set the permissions claim to a list of strings.
    pub fn with_permissions(self, permissions: &[&str]) -> Self {
        self.with_claim("permissions", json!(permissions))
    }

    /// Remove the permissions claim entirely.
    pub fn without_permissions(self) -> Self {
        self.without_claim("permissions")
    }

    /// Set expiration in seconds from now (negative for the past).
    pub fn expires_in(self, seconds: i64) -> Self {
        self.with_claim(
            "exp",
            json!((Utc::now() + Duration::seconds(seconds)).timestamp()),
        )
    }

    /// Set an arbitrary claim.
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    pub fn without_claim(mut self, name: &str) -> Self {
        self.claims.remove(name);
        self
    }

    /// Build the claims as a JSON value.
    pub fn build(self) -> Value {
        Value::Object(self.claims)
    }
}

impl Default for TestClaimsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
