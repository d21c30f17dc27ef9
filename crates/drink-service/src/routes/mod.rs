//! HTTP routes for the drink service.
//!
//! Defines the Axum router and application state.

use crate::auth::AuthGate;
use crate::handlers;
use crate::middleware::{guarded, http_metrics_middleware};
use crate::repositories::DrinkRepository;
use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Permission required by `GET /drinks-detail`.
pub const PERMISSION_GET_DRINKS_DETAIL: &str = "get:drinks-detail";

/// Permission required by `POST /drinks`.
pub const PERMISSION_POST_DRINKS: &str = "post:drinks";

/// Permission required by `PATCH /drinks/:id`.
pub const PERMISSION_PATCH_DRINKS: &str = "patch:drinks";

/// Permission required by `DELETE /drinks/:id`.
pub const PERMISSION_DELETE_DRINKS: &str = "delete:drinks";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Drink storage.
    pub repo: Arc<dyn DrinkRepository>,
}

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/`, `/health`, `/metrics` - public
/// - `GET /drinks` - public, short representation
/// - `GET /drinks-detail` - requires `get:drinks-detail`
/// - `POST /drinks` - requires `post:drinks`
/// - `PATCH /drinks/:id` - requires `patch:drinks`
/// - `DELETE /drinks/:id` - requires `delete:drinks`
/// - TraceLayer for request logging
/// - HTTP metrics middleware
/// - 30 second request timeout
pub fn build_routes(
    state: Arc<AppState>,
    gate: Arc<AuthGate>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let drink_routes = Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route(
            "/drinks",
            get(handlers::list_drinks).merge(guarded(
                post(handlers::create_drink),
                &gate,
                PERMISSION_POST_DRINKS,
            )),
        )
        .route(
            "/drinks-detail",
            guarded(
                get(handlers::get_drinks_detail),
                &gate,
                PERMISSION_GET_DRINKS_DETAIL,
            ),
        )
        .route(
            "/drinks/:id",
            guarded(
                patch(handlers::update_drink),
                &gate,
                PERMISSION_PATCH_DRINKS,
            )
            .merge(guarded(
                delete(handlers::delete_drink),
                &gate,
                PERMISSION_DELETE_DRINKS,
            )),
        )
        .with_state(state);

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer (innermost)
    // 2. TraceLayer
    // 3. http_metrics_middleware (outermost, sees every response)
    drink_routes
        .merge(metrics_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(middleware::from_fn(http_metrics_middleware))
}
