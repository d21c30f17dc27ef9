//! Mock JWKS endpoint backed by wiremock.

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock publishes the key set on.
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Mock identity provider publishing a JSON Web Key Set.
pub struct MockJwksServer {
    server: MockServer,
}

impl MockJwksServer {
    /// Start a server publishing `keys`.
    pub async fn start(keys: Vec<Value>) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": keys })))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Start a server whose JWKS endpoint answers with `status`.
    pub async fn start_failing(status: u16) -> Self {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&server)
            .await;

        Self { server }
    }

    /// Full URL of the JWKS endpoint.
    pub fn jwks_url(&self) -> String {
        format!("{}{}", self.server.uri(), JWKS_PATH)
    }

    /// Number of JWKS requests received so far.
    pub async fn fetch_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    /// Underlying wiremock server for custom expectations.
    pub fn server(&self) -> &MockServer {
        &self.server
    }
}
