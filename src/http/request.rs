//! Inbound request capture.
//!
//! # Responsibilities
//! - Buffer the body once so it can be both logged and handled
//! - Build and store a `LogRecord` for every request, matched or not
//! - Emit attack warnings with the replay command
//!
//! # Design Decisions
//! - Capture runs inside the request-id layer, so the id is in the record
//! - An unreadable or oversized body is logged as empty and the request
//!   is answered here; handlers never see a truncated body

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use http_body_util::LengthLimitError;
use serde_json::json;
use std::error::Error as StdError;

use crate::capture::{InboundRequest, LogRecord};
use crate::http::server::AppState;
use crate::observability::metrics;

/// Header carrying the per-request UUID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Middleware appending every inbound request to the shared logs.
pub async fn capture_request(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let (parts, body) = request.into_parts();

    let (bytes, rejection) = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => (bytes, None),
        Err(e) => {
            tracing::warn!(
                path = %parts.uri.path(),
                error = %e,
                "Request body unreadable, capturing without it"
            );
            (Bytes::new(), Some(body_rejection(&e, state.max_body_size)))
        }
    };

    let record = LogRecord::build(&InboundRequest::from_parts(&parts, &bytes));
    let request_id = parts
        .headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    metrics::record_capture(&record.method);
    if record.is_attack {
        for category in &record.attack_types {
            metrics::record_attack(*category);
        }
        tracing::warn!(
            request_id,
            method = %record.method,
            path = %record.path,
            remote_addr = %record.remote_addr,
            attack_types = %record.attack_labels(),
            "Suspected attack"
        );
        tracing::warn!(request_id, replay = %record.replay_command, "Attack replay command");
    } else {
        tracing::debug!(
            request_id,
            method = %record.method,
            path = %record.path,
            remote_addr = %record.remote_addr,
            "Request captured"
        );
    }

    state.logs.record(record);

    if let Some(rejection) = rejection {
        return rejection;
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// 413 when the body ran past the limit, 400 for any other read failure.
fn body_rejection(err: &axum::Error, limit: usize) -> Response {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            let message = format!("request body exceeds {limit} bytes");
            return error_response(StatusCode::PAYLOAD_TOO_LARGE, message);
        }
        source = cause.source();
    }
    error_response(StatusCode::BAD_REQUEST, "request body could not be read".to_string())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "status": "error", "message": message }))).into_response()
}
