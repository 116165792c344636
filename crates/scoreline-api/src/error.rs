use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use scoreline_db::{ErrorKind, LedgerError};
use scoreline_types::api::ErrorResponse;

/// Handler error: a ledger failure, a request that could not be decoded, or
/// the blocking task dying under us.
#[derive(Debug)]
pub enum ApiError {
    Ledger(LedgerError),
    /// Malformed body, path or query string.
    BadRequest(String),
    Join,
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self::Ledger(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Ledger(err) => {
                let status = match err.kind() {
                    ErrorKind::Validation => StatusCode::BAD_REQUEST,
                    ErrorKind::NotFound => StatusCode::NOT_FOUND,
                    ErrorKind::Conflict => StatusCode::CONFLICT,
                    ErrorKind::Internal => {
                        error!("Ledger error: {}", err);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                // internals stay in the log
                let message = match err.kind() {
                    ErrorKind::Internal => "internal error".to_string(),
                    _ => err.to_string(),
                };
                (status, err.code(), message)
            }
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, "ValidationError", message),
            Self::Join => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalError",
                "internal error".to_string(),
            ),
        };

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message,
            }),
        )
            .into_response()
    }
}
