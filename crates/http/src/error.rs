//! Error handling for the bookshelf HTTP layer

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::response::ApiResponse;

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Rendered with the outermost context only; the full chain is logged.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = match self {
            AppError::Validation(message)
            | AppError::NotFound(message)
            | AppError::BadRequest(message)
            | AppError::MethodNotAllowed(message) => {
                tracing::warn!(status_code = %status.as_u16(), %message, "request rejected");
                message
            }
            AppError::Internal(e) => {
                tracing::error!(
                    status_code = %status.as_u16(),
                    error = %format!("{e:#}"),
                    "request failed"
                );
                e.to_string()
            }
        };

        (status, ApiResponse::fail(message)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use serde_json::{json, Value};

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_bad_request() {
        let response = AppError::validation("Please provide the book name").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"status": "fail", "message": "Please provide the book name"})
        );
    }

    #[tokio::test]
    async fn test_not_found_mapping() {
        let response = AppError::not_found("Book not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["message"], "Book not found");
    }

    #[tokio::test]
    async fn test_method_not_allowed_mapping() {
        let response =
            AppError::MethodNotAllowed("Method not allowed".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(response).await,
            json!({"status": "fail", "message": "Method not allowed"})
        );
    }

    #[tokio::test]
    async fn test_internal_error_shows_outer_context_only() {
        let cause: anyhow::Result<()> = Err(anyhow::anyhow!("lock poisoned"));
        let error = AppError::from(cause.context("Failed to add book").unwrap_err());

        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"status": "fail", "message": "Failed to add book"})
        );
    }
}
