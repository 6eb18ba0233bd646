use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::gateway::GatewayError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited; retry after {}s", .retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Model response failed validation: {0}")]
    SchemaViolation(String),
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidInput(msg) => AppError::Validation(msg),
            GatewayError::RateLimitExceeded { retry_after } => AppError::RateLimited { retry_after },
            GatewayError::UpstreamUnavailable(msg) => AppError::UpstreamUnavailable(msg),
            GatewayError::MalformedResponse(e) => AppError::MalformedResponse(e.0),
            GatewayError::SchemaViolation(e) => AppError::SchemaViolation(e.0),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::RateLimited { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RATE_LIMITED",
                "Too many requests, please slow down".to_string(),
            ),
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Upstream error: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "UPSTREAM_UNAVAILABLE",
                    "The AI service is temporarily unavailable".to_string(),
                )
            }
            AppError::MalformedResponse(msg) => {
                tracing::error!("Malformed model response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_RESPONSE",
                    "The AI service returned an unreadable response".to_string(),
                )
            }
            AppError::SchemaViolation(msg) => {
                tracing::error!("Schema violation: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "SCHEMA_VIOLATION",
                    "The AI service returned an invalid response".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        match self {
            AppError::RateLimited { retry_after } => {
                // Round up so clients never retry inside the window
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                (status, [(header::RETRY_AFTER, secs.max(1).to_string())], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
