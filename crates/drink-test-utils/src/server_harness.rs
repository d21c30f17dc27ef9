//! Test server harness for E2E testing
//!
//! Provides `TestDrinkServer` for spawning real drink service instances in
//! tests, backed by the in-memory repository.

use crate::token_builders::{TEST_AUDIENCE, TEST_AUTH_DOMAIN};
use drink_service::auth::AuthGate;
use drink_service::config::Config;
use drink_service::repositories::InMemoryDrinkRepository;
use drink_service::routes::{self, init_metrics_recorder, AppState};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;

/// Global metrics handle shared by every test server in the process.
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}

/// Test harness for spawning the drink service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// let jwks = MockJwksServer::start(vec![key.jwk_json()]).await;
/// let server = TestDrinkServer::spawn(&jwks.jwks_url()).await?;
/// let response = reqwest::get(format!("{}/drinks", server.url())).await?;
/// assert_eq!(response.status(), 200);
/// ```
pub struct TestDrinkServer {
    addr: SocketAddr,
    repo: Arc<InMemoryDrinkRepository>,
    _handle: JoinHandle<()>,
}

impl TestDrinkServer {
    /// Spawn a server that verifies tokens against `jwks_url`.
    ///
    /// Accepts RS256 and EdDSA, with the harness issuer and audience.
    pub async fn spawn(jwks_url: &str) -> Result<Self, anyhow::Error> {
        Self::spawn_with_vars(jwks_url, HashMap::new()).await
    }

    /// Spawn with extra environment overrides (e.g. `JWKS_CACHE_TTL_SECONDS`).
    pub async fn spawn_with_vars(
        jwks_url: &str,
        overrides: HashMap<String, String>,
    ) -> Result<Self, anyhow::Error> {
        let mut vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://test/test".to_string(),
            ),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("AUTH_DOMAIN".to_string(), TEST_AUTH_DOMAIN.to_string()),
            ("AUTH_AUDIENCE".to_string(), TEST_AUDIENCE.to_string()),
            ("AUTH_JWKS_URL".to_string(), jwks_url.to_string()),
            ("AUTH_ALGORITHMS".to_string(), "RS256,EdDSA".to_string()),
            ("JWKS_FETCH_TIMEOUT_SECONDS".to_string(), "2".to_string()),
            ("DRAIN_SECONDS".to_string(), "0".to_string()),
        ]);
        vars.extend(overrides);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let repo = Arc::new(InMemoryDrinkRepository::new());
        let gate = Arc::new(AuthGate::from_config(&config.auth));
        let state = Arc::new(AppState {
            repo: repo.clone(),
        });

        let app = routes::build_routes(state, gate, test_metrics_handle());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            repo,
            _handle: handle,
        })
    }

    /// Base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// In-memory drink store behind the server.
    pub fn repo(&self) -> &Arc<InMemoryDrinkRepository> {
        &self.repo
    }
}

impl Drop for TestDrinkServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
