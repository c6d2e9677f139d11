use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API Error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("TTS model not initialized")]
    ModelNotReady,

    #[error("{0}")]
    Synthesis(#[from] anyhow::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::ModelNotReady => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Synthesis(e) => {
                tracing::error!("Error during synthesis: {e:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let error = match &self {
            // Include the cause chain so context-wrapped errors keep their root message.
            ApiError::Synthesis(e) => format!("{e:#}"),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_model_not_ready_is_503() {
        let (status, body) = body_json(ApiError::ModelNotReady).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "TTS model not initialized");
        assert_eq!(body["code"], 503);
    }

    #[tokio::test]
    async fn test_synthesis_error_keeps_cause() {
        let err = anyhow::anyhow!("CUDA out of memory").context("inference failed");
        let (status, body) = body_json(ApiError::from(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let msg = body["error"].as_str().unwrap();
        assert!(msg.contains("inference failed"));
        assert!(msg.contains("CUDA out of memory"));
    }
}
