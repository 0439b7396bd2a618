use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use http::StatusCode;
use serde_json::json;

use crate::state::AppState;

/// Report database connectivity
///
/// A closed pool is reported as `disconnected` with a 200; a live pool that
/// fails to answer is a 500.
pub(crate) async fn health(State(state): State<AppState>) -> Response {
    if state.database.is_closed() {
        return status_ok(&state, "disconnected");
    }

    match state.database.ping().await {
        Ok(()) => status_ok(&state, "connected"),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "database": "error",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

fn status_ok(state: &AppState, database: &str) -> Response {
    Json(json!({
        "status": "ok",
        "database": database,
        "environment": state.environment.as_str(),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use flexdb::{AppEnv, Database};
    use http::StatusCode;

    use crate::test_utils::{get, send, test_app};
    use crate::{AppState, router};

    #[tokio::test]
    async fn test_health_connected() {
        let (app, _db) = test_app().await;

        let (status, body) = send(&app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "connected");
        assert_eq!(body["environment"], "test");
        let timestamp = body["timestamp"].as_str().expect("timestamp string");
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_health_after_close_is_disconnected() {
        let (app, db) = test_app().await;
        db.close().await;

        let (status, body) = send(&app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["database"], "disconnected");
    }

    #[tokio::test]
    async fn test_health_unreachable_server_is_error() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://flexdb@127.0.0.1:1/unreachable")
            .expect("lazy pool");
        let state = AppState::new(Database::Postgres(pool), AppEnv::Production);

        let (status, body) = send(&router(state), get("/health")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(body["database"], "error");
        assert!(body["error"].is_string());
    }
}
