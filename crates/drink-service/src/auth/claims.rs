//! Decoded JWT claim set.
//!
//! Claims are kept as the issuer sent them: a JSON object keyed by claim name.
//! Only the verifier constructs a `Claims` from a token, so holding one means
//! signature and standard claims have been checked.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name of the claim carrying granted permissions.
pub const PERMISSIONS_CLAIM: &str = "permissions";

/// Verified JWT claim set.
///
/// The `sub` claim identifies a user and is redacted in Debug output.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Wrap a decoded claim mapping.
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Look up a claim by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Subject (user or client identifier), if present.
    pub fn sub(&self) -> Option<&str> {
        self.0.get("sub").and_then(Value::as_str)
    }

    /// Raw `permissions` claim, if present.
    pub fn permissions_claim(&self) -> Option<&Value> {
        self.0.get(PERMISSIONS_CLAIM)
    }

    /// String entries of the `permissions` claim.
    ///
    /// Returns an empty list when the claim is absent or not an array.
    pub fn permissions(&self) -> Vec<&str> {
        match self.permissions_claim() {
            Some(Value::Array(values)) => values.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Custom Debug implementation that redacts the `sub` claim.
impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.0 {
            if name == "sub" {
                map.entry(name, &"[REDACTED]");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims_from(value: Value) -> Claims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_claims_debug_redacts_sub() {
        let claims = claims_from(json!({
            "sub": "auth0|secret-user-id",
            "permissions": ["get:drinks-detail"]
        }));

        let debug_str = format!("{:?}", claims);

        assert!(
            !debug_str.contains("secret-user-id"),
            "Debug output should not contain sub: {}",
            debug_str
        );
        assert!(debug_str.contains("[REDACTED]"));
        assert!(debug_str.contains("get:drinks-detail"));
    }

    #[test]
    fn test_permissions_filters_non_strings() {
        let claims = claims_from(json!({"permissions": ["post:drinks", 7, null, "patch:drinks"]}));
        assert_eq!(claims.permissions(), vec!["post:drinks", "patch:drinks"]);
    }

    #[test]
    fn test_permissions_non_array_is_empty() {
        let claims = claims_from(json!({"permissions": "post:drinks"}));
        assert!(claims.permissions_claim().is_some());
        assert!(claims.permissions().is_empty());
    }

    #[test]
    fn test_serialization_is_transparent() {
        let value = json!({"sub": "user", "aud": "coffeeshop", "custom": {"nested": true}});
        let claims = claims_from(value.clone());

        assert_eq!(serde_json::to_value(&claims).unwrap(), value);
        assert_eq!(claims.sub(), Some("user"));
        assert_eq!(claims.get("custom"), Some(&json!({"nested": true})));
    }
}
