//! Error types for the HTTP server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Compilation against the Madek API failed
    #[error(transparent)]
    Compile(#[from] madek_compiler::Error),
}

impl ApiError {
    /// HTTP status and machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        use madek_compiler::Error as CompileError;

        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Compile(CompileError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            // Credentials belong to the server, not to the caller
            ApiError::Compile(err) if err.is_auth() => (StatusCode::BAD_GATEWAY, "UPSTREAM_AUTH"),
            ApiError::Compile(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMPILE_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use madek_compiler::Error as CompileError;

    fn status(err: ApiError) -> StatusCode {
        err.status_and_code().0
    }

    #[test]
    fn test_status_mapping() {
        let url = "https://madek.test/api/collections/c1".to_string();

        assert_eq!(
            status(ApiError::Compile(CompileError::NotFound { url: url.clone() })),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(ApiError::Compile(CompileError::InvalidAuthentication { url: url.clone() })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(ApiError::Compile(CompileError::AccessForbidden { url: url.clone() })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status(ApiError::Compile(CompileError::RequestFailed { url, status: 503 })),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status(ApiError::BadRequest("x".into())), StatusCode::BAD_REQUEST);
    }
}
