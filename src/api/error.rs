//! Error taxonomy for the account workflow.
//!
//! Validation and domain errors carry an explicit status and a stable,
//! user-safe message. Unexpected failures are logged with full detail
//! server-side and reduced to a generic message client-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed or missing input; always raised before any I/O.
    Validation(String),
    BadRequest(String),
    /// Email uniqueness violation.
    Conflict(String),
    NotFound(String),
    /// Credential or token failure.
    Unauthorized(String),
    /// The media uploader failed or returned no URL.
    Upload(String),
    /// The notifier failed while the caller is waiting on that email.
    Gateway(String),
    /// Catch-all for unexpected failures; detail stays server-side.
    Internal(anyhow::Error),
}

impl ApiError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upload(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Gateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(message)
            | Self::BadRequest(message)
            | Self::Conflict(message)
            | Self::NotFound(message)
            | Self::Unauthorized(message)
            | Self::Upload(message)
            | Self::Gateway(message) => message.clone(),
            Self::Internal(_) => "Internal server error.".to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            error!("unexpected error: {err:?}");
        }
        let body = Json(json!({ "message": self.message() }));
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Upload("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(ApiError::Gateway("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::Internal(anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_never_reaches_the_message() {
        let err = ApiError::Internal(anyhow!("connection refused to 10.0.0.5"));
        assert_eq!(err.message(), "Internal server error.");
    }
}
