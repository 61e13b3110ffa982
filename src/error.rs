//! API Error Handling
//! Mission: Map every failure onto the shared response envelope

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use validator::ValidationErrors;

/// One offending field in a validation failure
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// API error types, one per status class the service emits
#[derive(Debug)]
pub enum ApiError {
    /// 400 with per-field details
    Validation(Vec<FieldError>),
    /// 400 with a single message (malformed body, bad filter value)
    BadRequest(String),
    /// 401
    Unauthorized(String),
    /// 403
    Forbidden(String),
    /// 404
    NotFound(String),
    /// 409
    Conflict(String),
    /// 500, logged but never echoed to the client
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();

        ApiError::Validation(fields)
    }
}

/// Map a storage error onto 409 when it is a UNIQUE constraint violation.
///
/// Constraint violations are the enforcement point for "one rating per user
/// per store" and "one account per email", so racing writers both hit the
/// database and exactly one of them wins.
pub fn conflict_on_unique(err: anyhow::Error, conflict_msg: &str) -> ApiError {
    match err.downcast_ref::<rusqlite::Error>() {
        Some(db_err) if is_unique_violation(db_err) => {
            ApiError::Conflict(conflict_msg.to_string())
        }
        _ => ApiError::Internal(err),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    // SQLITE_CONSTRAINT_UNIQUE = 2067, SQLITE_CONSTRAINT_PRIMARYKEY = 1555
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && (e.extended_code == 2067 || e.extended_code == 1555)
    )
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::Validation(fields) => (
                StatusCode::BAD_REQUEST,
                "Validation Error".to_string(),
                Some(fields),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),
            ApiError::Internal(err) => {
                tracing::error!("Internal error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorBody {
            success: false,
            message,
            errors,
        });

        (status, body).into_response()
    }
}
