//! `canvass serve` -- HTTP JSON API for collecting and reporting surveys.
//!
//! Built on `axum` + `tokio`. The catalog is loaded once at startup and
//! shared by every handler, so collection and reporting always agree on
//! the question definitions.
//!
//! - CORS headers on all responses (permissive)
//! - Per-IP rate limiting (default: 60 req/min, configurable)
//! - Request body limit
//!
//! Endpoints:
//! - GET    /health               - Server status
//! - GET    /api/questions        - The question catalog
//! - POST   /api/questions        - Add a question
//! - PUT    /api/questions        - Replace a question by id
//! - DELETE /api/questions?id=N   - Remove a question
//! - POST   /api/submit-survey    - Store one submission
//! - GET    /api/results?group=G  - Aggregated report, optionally by group
//! - GET    /api/groups           - Distinct group ids
//!
//! All responses use Content-Type: application/json.

mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{middleware as axum_middleware, Json, Router};
use canvass_core::Catalog;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use self::handlers::{
    handle_create_question, handle_delete_question, handle_groups, handle_health,
    handle_list_questions, handle_not_found, handle_results, handle_submit_survey,
    handle_update_question,
};
use self::middleware::rate_limit_middleware;
use self::state::{AppState, RateLimiter};
use crate::stores::Stores;

/// Maximum request body size: 1 MB.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Rate limit window duration in seconds (1 minute).
const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/questions",
            get(handle_list_questions)
                .post(handle_create_question)
                .put(handle_update_question)
                .delete(handle_delete_question),
        )
        .route("/api/submit-survey", post(handle_submit_survey))
        .route("/api/results", get(handle_results))
        .route("/api/groups", get(handle_groups))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

/// Serve the API on `port` until Ctrl+C.
pub(crate) async fn start_server(
    port: u16,
    rate_limit: u64,
    stores: Stores,
    catalog: Catalog,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(rate_limit, "rate limit: requests per minute per IP");

    let state = Arc::new(AppState {
        catalog: RwLock::new(catalog),
        stores,
        rate_limiter: RateLimiter::new(rate_limit),
    });

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("canvass listening on http://{}", addr);
    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("received shutdown signal"),
        Err(e) => {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
