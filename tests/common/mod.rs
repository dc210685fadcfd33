//! Shared utilities for integration tests.

#![allow(dead_code)]

use attack_log_server::config::AppConfig;
use attack_log_server::forward::Forwarder;
use attack_log_server::http::{AppState, HttpServer};
use axum::body::{to_bytes, Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// One request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct Received {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// An HTTP backend that records every request it receives.
pub struct MockBackend {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Received>>>,
}

impl MockBackend {
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

/// Start a backend on an ephemeral port that answers every request with
/// `status` and `body` after `delay`.
pub async fn start_recording_backend(status: u16, body: String, delay: Duration) -> MockBackend {
    let received = Arc::new(Mutex::new(Vec::new()));
    let log = received.clone();

    let app = Router::new().fallback(move |request: Request<Body>| {
        let log = log.clone();
        let body = body.clone();
        async move {
            let (parts, payload) = request.into_parts();
            let payload = to_bytes(payload, 1024 * 1024).await.unwrap_or_default();
            log.lock().unwrap().push(Received {
                method: parts.method,
                path: parts.uri.path().to_string(),
                headers: parts.headers,
                body: payload,
            });
            tokio::time::sleep(delay).await;
            (StatusCode::from_u16(status).unwrap(), body)
        }
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend { addr, received }
}

/// An address with nothing listening on it.
pub fn closed_port() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// A router plus its state, driven without a socket.
pub fn app_with_client(config: &AppConfig, client: reqwest::Client) -> (Router, AppState) {
    let state = AppState::with_forwarder(config, Forwarder::with_client(client, &config.forward));
    let router = HttpServer::build_router(config, state.clone());
    (router, state)
}

pub fn app(config: &AppConfig) -> (Router, AppState) {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_millis(config.forward.timeout_ms))
        .build()
        .unwrap();
    app_with_client(config, client)
}

pub fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_text(resp: axum::response::Response) -> String {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
