use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
    routing::get,
};
use http::StatusCode;

use flexdb::{User, UserPayload, validate_create, validate_update};

use crate::error::{ApiError, IntoResponseError};
use crate::state::AppState;

/// Create a router for the user endpoints
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// A user id is a run of decimal digits naming a positive `i64`
fn parse_user_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::InvalidId);
    }
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::InvalidId)
}

fn user_id(path: Result<Path<String>, PathRejection>) -> Result<i64, ApiError> {
    let Path(raw) = path.map_err(|_| ApiError::InvalidId)?;
    parse_user_id(&raw)
}

async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let users = state
        .users
        .list_users()
        .await
        .into_response_error("Failed to fetch users")?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<User>, ApiError> {
    let id = user_id(path)?;
    let user = state
        .users
        .get_user(id)
        .await
        .into_response_error("Failed to fetch user")?;
    Ok(Json(user))
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let Json(payload) = payload?;
    let new_user = validate_create(&payload)?;

    let user = state
        .users
        .create_user(new_user)
        .await
        .into_response_error("Failed to create user")?;

    tracing::info!(user_id = user.id, "Created user");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<UserPayload>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let id = user_id(path)?;
    let Json(payload) = payload?;
    let changes = validate_update(&payload)?;

    let user = state
        .users
        .update_user(id, changes)
        .await
        .into_response_error("Failed to update user")?;

    tracing::info!(user_id = user.id, "Updated user");
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = user_id(path)?;
    state
        .users
        .delete_user(id)
        .await
        .into_response_error("Failed to delete user")?;

    tracing::info!(user_id = id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}
