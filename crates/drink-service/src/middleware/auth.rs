//! Permission guard for protected routes.
//!
//! Each protected route is wrapped with its own guard built from the shared
//! [`AuthGate`] and the permission the route requires. On success the
//! verified claims are inserted into request extensions for the handler.

use crate::auth::AuthGate;
use crate::errors::DrinkError;
use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};
use std::sync::Arc;
use tracing::instrument;

/// State for one guarded route.
#[derive(Clone)]
pub struct PermissionGuard {
    /// Shared authorization gate.
    pub gate: Arc<AuthGate>,

    /// Permission the route requires (e.g., "post:drinks").
    pub permission: &'static str,
}

/// Authorization middleware for a single route.
///
/// # Response
///
/// - 401 with a WWW-Authenticate challenge if the credential is missing,
///   malformed or unverifiable
/// - 400, 403 or 503 for the remaining authorization failures
/// - Otherwise continues to the handler with `Claims` in extensions
#[instrument(skip_all, name = "drinks.middleware.auth")]
pub async fn require_permission(
    State(guard): State<PermissionGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, DrinkError> {
    let claims = guard
        .gate
        .authorize(guard.permission, req.headers())
        .await?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Wrap every method of `route` with a guard requiring `permission`.
pub fn guarded<S>(
    route: MethodRouter<S>,
    gate: &Arc<AuthGate>,
    permission: &'static str,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(middleware::from_fn_with_state(
        PermissionGuard {
            gate: Arc::clone(gate),
            permission,
        },
        require_permission,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::auth::{Claims, JwksClient, TokenVerifier};
    use crate::config::AuthConfig;
    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request as HttpRequest, StatusCode},
        routing::get,
        Extension, Router,
    };
    use jsonwebtoken::Algorithm;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_gate() -> Arc<AuthGate> {
        let config = AuthConfig {
            domain: "issuer.example.com".to_string(),
            audience: "coffeeshop".to_string(),
            issuer: "https://issuer.example.com/".to_string(),
            jwks_url: "http://127.0.0.1:1/.well-known/jwks.json".to_string(),
            algorithms: vec![Algorithm::RS256],
            jwks_fetch_timeout: Duration::from_secs(1),
            jwks_cache_ttl: Duration::ZERO,
            leeway_seconds: 0,
        };
        let client = Arc::new(JwksClient::new(
            config.jwks_url.clone(),
            config.jwks_fetch_timeout,
        ));
        Arc::new(AuthGate::new(TokenVerifier::new(client, &config)))
    }

    async fn protected(Extension(claims): Extension<Claims>) -> String {
        claims.sub().unwrap_or_default().to_string()
    }

    async fn public() -> &'static str {
        "public"
    }

    fn test_app() -> Router {
        let gate = test_gate();
        Router::new().route(
            "/item",
            get(public).merge(guarded(
                axum::routing::post(protected),
                &gate,
                "post:items",
            )),
        )
    }

    #[tokio::test]
    async fn test_missing_header_rejected_with_challenge() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/item")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key("www-authenticate"));
    }

    #[tokio::test]
    async fn test_malformed_header_rejected() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/item")
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unguarded_method_on_same_path_is_public() {
        let request = HttpRequest::builder()
            .method("GET")
            .uri("/item")
            .body(Body::empty())
            .unwrap();

        let response = test_app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
