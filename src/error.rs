//! The API's error taxonomy and its single HTTP mapping point.
//!
//! Handlers, guards, and the auth extractor all speak `ApiError`; the
//! `IntoResponse` impl below is the only place a variant turns into a status
//! code and JSON body. Store errors cross this boundary through the
//! `From<sqlx::Error>` impl, which classifies constraint violations and hides
//! everything else behind a logged 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// One failed field in a validation response.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldError {
    /// The offending payload field.
    #[schema(value_type = String)]
    pub field: &'static str,
    /// Human-readable constraint description.
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// ApiError
///
/// Everything a request can fail with, ordered by precedence: a request that
/// is both unauthenticated and unauthorized reports unauthenticated, because
/// the extractor rejects before any guard runs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// 400 — the payload violated one or more field constraints.
    #[error("validation failure")]
    Validation(Vec<FieldError>),
    /// 401 — missing, malformed, expired, or forged credentials.
    #[error("unauthenticated")]
    Unauthenticated,
    /// 403 — authenticated, but neither the owner nor an admin.
    #[error("forbidden")]
    Forbidden,
    /// 404 — the addressed resource does not exist.
    #[error("not found")]
    NotFound,
    /// 409 — a uniqueness constraint would be violated.
    #[error("{0}")]
    Conflict(String),
    /// 500 — unexpected failure; details go to the log, never the client.
    #[error("internal server error")]
    Internal,
}

/// The JSON error body every non-2xx response carries.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            error: self.to_string(),
            fields: match self {
                ApiError::Validation(fields) => Some(fields),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ApiError::Conflict("resource already exists".to_string())
            }
            // A bad parent reference reads as "that thing isn't there".
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => ApiError::NotFound,
            _ => {
                tracing::error!(error = %err, "database failure");
                ApiError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_carries_its_field_list() {
        let err = ApiError::Validation(vec![FieldError::new("title", "too short")]);
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_message_is_the_error_text() {
        assert_eq!(
            ApiError::Conflict("tag name already in use".to_string()).to_string(),
            "tag name already in use"
        );
    }

    #[test]
    fn row_not_found_maps_to_404() {
        assert_eq!(ApiError::from(sqlx::Error::RowNotFound), ApiError::NotFound);
    }
}
