use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Every handler failure maps through this taxonomy; clients always receive
/// the same `{"error": "<message>"}` envelope and never internal detail.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid identifier")]
    InvalidId,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("forbidden")]
    Forbidden,
    #[error("email already registered")]
    DuplicateEmail,
    #[error("store unavailable")]
    StoreUnavailable,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidId | ApiError::DuplicateEmail => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidCredentials | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            // Detail stays in the server log, never in the response body.
            ApiError::Internal(e) => error!(error = %e, "internal error"),
            other => warn!(%status, error = %other, "request failed"),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
                ApiError::DuplicateEmail
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => ApiError::StoreUnavailable,
            _ => ApiError::Internal(e.into()),
        }
    }
}

/// Identifiers are opaque store-generated strings; a malformed one is a
/// client error, never a 500.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::InvalidId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidId.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("ride").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::StoreUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_leaked() {
        let e = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.1"));
        assert_eq!(e.to_string(), "internal error");
    }

    #[test]
    fn parse_id_rejects_malformed() {
        assert!(parse_id("not-a-uuid").is_err());
        assert!(parse_id("d4f9aee8-0000-4c36-9e7a-000000000000").is_ok());
    }
}
