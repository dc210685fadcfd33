//! Log records built from inbound requests.
//!
//! Building a record never fails. Anything that cannot be decoded is
//! replaced by a placeholder so logging can never block the response path.
//!
//! Header names are stored as the HTTP stack delivers them, which is
//! lowercase; the client's original casing is not recoverable.

use axum::extract::ConnectInfo;
use axum::http::{request::Parts, HeaderMap};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use uuid::Uuid;

use crate::capture::detector::{classify, AttackCategory};

/// Placeholder for an address the transport did not expose.
pub const UNKNOWN_ADDR: &str = "unknown";

/// The inbound request as the capture pipeline sees it.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub method: &'a str,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub headers: &'a HeaderMap,
    pub body: &'a [u8],
    pub remote_addr: Option<SocketAddr>,
}

impl<'a> InboundRequest<'a> {
    /// Borrow the capture view out of buffered request parts.
    ///
    /// The remote address comes from axum's `ConnectInfo`, which is absent
    /// when the router is driven without a socket (tests, some transports).
    pub fn from_parts(parts: &'a Parts, body: &'a [u8]) -> Self {
        Self {
            method: parts.method.as_str(),
            path: parts.uri.path(),
            query: parts.uri.query(),
            headers: &parts.headers,
            body,
            remote_addr: parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        }
    }
}

/// One captured request. Immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Local>,
    pub method: String,
    pub path: String,
    pub remote_addr: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    pub query: String,
    pub is_attack: bool,
    pub attack_types: BTreeSet<AttackCategory>,
    pub replay_command: String,
}

impl LogRecord {
    /// Build a record, classifying body and query independently.
    pub fn build(request: &InboundRequest<'_>) -> Self {
        let body = String::from_utf8_lossy(request.body).into_owned();
        let query = request.query.unwrap_or_default().to_string();

        // Last write wins for repeated header names. Names arrive lowercased.
        let headers: BTreeMap<String, String> = request
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let verdict = classify(&body).union(classify(&query));
        let replay_command = replay_command(request.method, request.path, &query, &headers, &body);

        Self {
            id: Uuid::new_v4(),
            timestamp: Local::now(),
            method: request.method.to_string(),
            path: request.path.to_string(),
            remote_addr: request
                .remote_addr
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| UNKNOWN_ADDR.to_string()),
            headers,
            body,
            query,
            is_attack: verdict.is_attack(),
            attack_types: verdict.into_categories(),
            replay_command,
        }
    }

    /// Comma-separated category labels, empty for clean records.
    pub fn attack_labels(&self) -> String {
        self.attack_types
            .iter()
            .map(|c| c.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Literal curl reconstruction for operators. Never parsed back.
fn replay_command(
    method: &str,
    path: &str,
    query: &str,
    headers: &BTreeMap<String, String>,
    body: &str,
) -> String {
    let host = headers.get("host").map(String::as_str).unwrap_or("localhost");
    let mut url = format!("http://{host}{path}");
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }
    format!(
        "curl -X {method} \"{url}\" -H \"Content-Type: application/x-www-form-urlencoded\" -d \"{body}\""
    )
}
