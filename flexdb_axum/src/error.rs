use axum::{
    Json,
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde_json::json;

use flexdb::{ServiceError, ValidationErrors};

/// Every failure a handler can report, rendered as `{"error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Path id is not a positive integer
    InvalidId,
    Validation(String),
    /// Body could not be read as JSON
    BadRequest(String),
    /// Service failure; `context` is the message used for storage errors
    Service {
        error: ServiceError,
        context: &'static str,
    },
    RouteNotFound,
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Service { error, .. } => match error {
                ServiceError::NotFound => StatusCode::NOT_FOUND,
                ServiceError::EmailExists => StatusCode::BAD_REQUEST,
                ServiceError::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Self::InvalidId => "Invalid user ID".to_string(),
            Self::Validation(message) | Self::BadRequest(message) => message.clone(),
            Self::Service { error, context } => match error {
                ServiceError::DatabaseError => context.to_string(),
                other => other.to_string(),
            },
            Self::RouteNotFound => "Endpoint not found".to_string(),
            Self::Internal => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = ?self, "Request rejected");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors.first_message().to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Helper trait for turning service results into handler results
pub(crate) trait IntoResponseError<T> {
    /// `context` is reported when the service hit a storage failure
    fn into_response_error(self, context: &'static str) -> Result<T, ApiError>;
}

impl<T> IntoResponseError<T> for Result<T, ServiceError> {
    fn into_response_error(self, context: &'static str) -> Result<T, ApiError> {
        self.map_err(|error| ApiError::Service { error, context })
    }
}
