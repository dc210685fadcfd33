//! Route handlers.

use axum::{
    body::Bytes,
    extract::{Form, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::capture::detector::contains_script_tag;
use crate::capture::LogRecord;
use crate::forward::{ForwardOutcome, ForwardRequest, Forwarder};
use crate::http::pages;
use crate::http::response::ApiError;
use crate::http::server::AppState;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(pages::index(state.mode))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Simulated login that splices the credentials into SQL unescaped.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Json<Value> {
    let query = format!(
        "SELECT * FROM users WHERE username='{}' AND password='{}'",
        form.username, form.password
    );

    tracing::debug!(username = %form.username, "Login attempt");
    tracing::debug!(query = %query, "Simulated SQL query");

    if form.username.contains('\'') || form.password.contains('\'') {
        tracing::warn!(username = %form.username, "Possible SQL injection in login form");
    }

    let mut body = json!({ "status": "success", "query": query });
    if state.mode.is_dev() {
        body["debug_info"] = json!({
            "username_length": form.username.chars().count(),
            "has_special_chars": form.username.chars().any(|c| "'\"\\;".contains(c)),
        });
    }
    Json(body)
}

pub async fn comments_page() -> Html<String> {
    Html(pages::comments_form())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub comment: String,
}

/// Stores nothing and echoes the comment back unescaped.
pub async fn post_comment(Form(form): Form<CommentForm>) -> Html<String> {
    tracing::debug!(comment = %form.comment, "Comment received");
    if contains_script_tag(&form.comment) {
        tracing::warn!(comment = %form.comment, "Possible XSS in comment");
    }
    Html(pages::comment_added(&form.comment))
}

/// Log receiver: print what arrived and acknowledge.
pub async fn receive_log(headers: HeaderMap, body: Bytes) -> Json<Value> {
    for (name, value) in &headers {
        tracing::debug!(header = %name, value = ?value, "Log receiver header");
    }

    let text = String::from_utf8_lossy(&body);
    match serde_json::from_str::<Value>(&text) {
        Ok(data) => tracing::info!(data = %data, "Log received"),
        Err(_) => tracing::info!(body = %text, "Log received (not JSON)"),
    }

    Json(json!({ "status": "success", "message": "Log received and printed" }))
}

#[derive(Debug, Serialize)]
pub struct ForwardResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub response_status: u16,
    pub response_text: String,
}

/// Re-issue the request described by the body and relay the result.
pub async fn forward_log(State(state): State<AppState>, body: Bytes) -> Response {
    tracing::debug!(body = %String::from_utf8_lossy(&body), "Forward payload received");

    let forwarder = state.forwarder.load_full();
    match forward_payload(&forwarder, &body).await {
        Ok(outcome) => Json(ForwardResponse {
            status: "success",
            message: "Request forwarded",
            response_status: outcome.status,
            response_text: outcome.body_preview,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Forward request failed");
            err.render(state.mode)
        }
    }
}

async fn forward_payload(forwarder: &Forwarder, body: &[u8]) -> Result<ForwardOutcome, ApiError> {
    let request = ForwardRequest::from_json(body, forwarder.default_host())?;
    Ok(forwarder.forward(&request).await?)
}

#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub mode: &'static str,
    pub captured_total: u64,
    pub request_log_len: usize,
    pub attack_log_len: usize,
}

pub async fn status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "online",
        message: "Attack log server is running",
        version: env!("CARGO_PKG_VERSION"),
        mode: state.mode.as_str(),
        captured_total: state.logs.captured_total(),
        request_log_len: state.logs.requests().len(),
        attack_log_len: state.logs.attacks().len(),
    })
}

pub async fn request_log_json(State(state): State<AppState>) -> Json<Vec<Arc<LogRecord>>> {
    Json(state.logs.requests().snapshot_newest_first())
}

pub async fn attack_log_json(State(state): State<AppState>) -> Json<Vec<Arc<LogRecord>>> {
    Json(state.logs.attacks().snapshot_newest_first())
}

pub async fn request_dashboard(State(state): State<AppState>) -> Html<String> {
    Html(pages::request_dashboard(&state.logs.requests().snapshot_newest_first()))
}

pub async fn attack_dashboard(State(state): State<AppState>) -> Html<String> {
    Html(pages::attack_dashboard(&state.logs.attacks().snapshot_newest_first()))
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "status": "error", "message": "not found" })))
}
