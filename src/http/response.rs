//! Error responses.
//!
//! Every failure on the API surface becomes a JSON body; nothing surfaces
//! as a raw fault. The dev posture adds the error's source chain.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::any::Any;
use std::error::Error as StdError;
use thiserror::Error;

use crate::config::ServerMode;
use crate::forward::{ForwardError, PayloadError};

/// Errors returned by the forwarding endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Forward(#[from] ForwardError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Payload(_) => StatusCode::BAD_REQUEST,
            ApiError::Forward(ForwardError::InvalidTarget { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Forward(ForwardError::Client(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Forward(ForwardError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Forward(ForwardError::Connect { .. } | ForwardError::Upstream { .. }) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Render as `{status: "error", message}` plus `detail` in dev mode.
    pub fn render(&self, mode: ServerMode) -> Response {
        let detail = mode.is_dev().then(|| source_chain(self)).filter(|d| !d.is_empty());
        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
            detail,
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Vec<String>>,
}

fn source_chain(err: &dyn StdError) -> Vec<String> {
    let mut chain = Vec::new();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

/// Response for a panicking handler.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>, mode: ServerMode) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    tracing::error!(panic = %message, "Handler panicked");

    let body = if mode.is_dev() {
        serde_json::json!({ "error": "internal server error", "detail": message })
    } else {
        serde_json::json!({ "error": "internal server error" })
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
