//! Drink service error types.
//!
//! All errors map to HTTP status codes via the `IntoResponse` impl and share
//! one JSON failure body. Database details are logged server-side only.

use crate::auth::AuthError;
use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Challenge sent with every 401 response.
const WWW_AUTHENTICATE_CHALLENGE: &str = "Bearer realm=\"drink-service\", error=\"invalid_token\"";

/// Drink service error type.
///
/// Maps to HTTP status codes:
/// - Auth: 401, 400, 403 or 503 depending on the authorization failure
/// - NotFound: 404 Not Found
/// - Unprocessable: 422 Unprocessable Entity
/// - Database: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum DrinkError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl DrinkError {
    /// HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            DrinkError::Auth(err) => err.status_code(),
            DrinkError::NotFound(_) => StatusCode::NOT_FOUND,
            DrinkError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DrinkError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code placed in the failure body.
    pub fn code(&self) -> &'static str {
        match self {
            DrinkError::Auth(err) => err.code(),
            DrinkError::NotFound(_) => "not_found",
            DrinkError::Unprocessable(_) => "unprocessable",
            DrinkError::Database(_) => "internal_error",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: u16,
    code: &'static str,
    message: String,
}

impl IntoResponse for DrinkError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            DrinkError::Auth(err) => err.to_string(),
            DrinkError::NotFound(resource) => format!("resource not found: {resource}"),
            DrinkError::Unprocessable(reason) => reason.clone(),
            DrinkError::Database(err) => {
                tracing::error!(target: "drinks.database", error = %err, "Database operation failed");
                "internal server error".to_string()
            }
        };

        let body = ErrorResponse {
            success: false,
            error: status.as_u16(),
            code: self.code(),
            message,
        };

        let mut response = (status, Json(body)).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE_CHALLENGE),
            );
        }

        response
    }
}

impl From<sqlx::Error> for DrinkError {
    fn from(err: sqlx::Error) -> Self {
        DrinkError::Database(err.to_string())
    }
}
