//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Failures of an image deletion request.
///
/// Every variant is rendered as a JSON envelope; none escape the handler.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeleteError {
    #[error("Origin not allowed")]
    OriginRejected,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UpstreamFailure(String),
}

impl DeleteError {
    pub fn no_authorization_header() -> Self {
        Self::Unauthenticated("No authorization header".to_string())
    }

    pub fn unauthorized() -> Self {
        Self::Unauthenticated("Unauthorized".to_string())
    }

    pub fn missing_image_path() -> Self {
        Self::BadRequest("Image path is required".to_string())
    }

    pub fn invalid_image_path() -> Self {
        Self::BadRequest("Invalid image path".to_string())
    }

    /// HTTP status for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            DeleteError::OriginRejected => StatusCode::FORBIDDEN,
            DeleteError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            DeleteError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DeleteError::UpstreamFailure(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Metrics label for this error kind.
    pub fn outcome(&self) -> &'static str {
        match self {
            DeleteError::OriginRejected => "origin_rejected",
            DeleteError::Unauthenticated(_) => "unauthenticated",
            DeleteError::BadRequest(_) => "bad_request",
            DeleteError::UpstreamFailure(_) => "upstream_failure",
        }
    }
}

/// JSON body shared by every image endpoint response.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            message: None,
            error: Some(error.into()),
        }
    }
}

impl IntoResponse for DeleteError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            DeleteError::UpstreamFailure(msg) => {
                tracing::warn!(error = %msg, "image deletion failed upstream");
            }
            _ => tracing::debug!(error = %self, status = status.as_u16(), "request rejected"),
        }

        // A rejected origin never reached the handler, so the body carries no
        // success flag.
        let body = match self {
            DeleteError::OriginRejected => ApiResponse {
                success: None,
                message: None,
                error: Some(DeleteError::OriginRejected.to_string()),
            },
            other => ApiResponse::failure(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias using DeleteError.
pub type DeleteResult<T> = Result<T, DeleteError>;
