//! Combined router for the user API

use std::any::Any;

use axum::{
    Json, Router,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tower_http::LatencyUnit;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::error::ApiError;
use crate::health::health;
use crate::state::AppState;

/// Create the application router with HTTP tracing
///
/// Endpoints:
/// - `GET /`
/// - `GET|POST /users`
/// - `GET|PUT|DELETE /users/{id}`
/// - `GET /health`
///
/// Anything else answers 404 `{"error": "Endpoint not found"}`.
pub fn router(state: AppState) -> Router {
    router_no_trace(state).layer(
        TraceLayer::new_for_http()
            .make_span_with(
                DefaultMakeSpan::new()
                    .level(Level::INFO)
                    .include_headers(true),
            )
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .latency_unit(LatencyUnit::Millis),
            ),
    )
}

/// Same as [`router`] without the HTTP tracing middleware
pub fn router_no_trace(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .merge(crate::users::router())
        .fallback(endpoint_not_found)
        .method_not_allowed_fallback(endpoint_not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn index() -> Json<Value> {
    Json(json!({
        "message": "Flexible Database API",
        "endpoints": {
            "users": "/users",
            "health": "/health",
        }
    }))
}

async fn endpoint_not_found() -> ApiError {
    ApiError::RouteNotFound
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Handler panicked");

    ApiError::Internal.into_response()
}
