//! Outbound request execution.
//!
//! # Design Decisions
//! - Exactly one attempt per call, no retry
//! - Every call is bounded by the client timeout
//! - Only a short prefix of the remote body is read and kept

use std::time::{Duration, Instant};
use url::Url;

use crate::config::ForwardConfig;
use crate::forward::error::ForwardError;
use crate::forward::request::ForwardRequest;
use crate::observability::metrics;

/// Result of a completed outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardOutcome {
    pub status: u16,
    pub body_preview: String,
}

/// Issues forward requests with a shared connection pool.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    default_host: String,
    preview_chars: usize,
}

impl Forwarder {
    /// Build a forwarder whose client enforces `timeout_ms`.
    pub fn new(config: &ForwardConfig) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(ForwardError::Client)?;
        Ok(Self::with_client(client, config))
    }

    /// Use a caller-supplied client. Its timeout settings are kept as-is.
    pub fn with_client(client: reqwest::Client, config: &ForwardConfig) -> Self {
        Self {
            client,
            default_host: config.default_host.clone(),
            preview_chars: config.preview_chars,
        }
    }

    /// Host targeted when a payload names none.
    pub fn default_host(&self) -> &str {
        &self.default_host
    }

    /// Perform the outbound call described by `request`.
    pub async fn forward(&self, request: &ForwardRequest) -> Result<ForwardOutcome, ForwardError> {
        let target = request.target_url();
        let method = request.method.as_str();
        let start = Instant::now();

        let url = match Url::parse(&target) {
            Ok(url) => url,
            Err(source) => {
                metrics::record_forward(method, "rejected", start);
                return Err(ForwardError::InvalidTarget { url: target, source });
            }
        };

        tracing::info!(method, url = %target, "Forwarding request");

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), url)
            .headers(request.headers.clone());
        if request.method.carries_body() {
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }
        }

        let result = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body_preview = read_preview(response, self.preview_chars).await?;
            Ok::<_, reqwest::Error>(ForwardOutcome { status, body_preview })
        }
        .await;

        match result {
            Ok(outcome) => {
                metrics::record_forward(method, "success", start);
                tracing::info!(
                    method,
                    url = %target,
                    status = outcome.status,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Forward completed"
                );
                Ok(outcome)
            }
            Err(e) => {
                let err = ForwardError::from_reqwest(&target, e);
                metrics::record_forward(method, err.outcome(), start);
                tracing::warn!(method, url = %target, error = %err, "Forward failed");
                Err(err)
            }
        }
    }
}

/// Read just enough of the body to produce `chars` characters.
async fn read_preview(mut response: reqwest::Response, chars: usize) -> Result<String, reqwest::Error> {
    // Four bytes is the longest UTF-8 encoding of a char.
    let byte_budget = chars.saturating_mul(4);
    let mut buf = Vec::new();
    while buf.len() < byte_budget {
        match response.chunk().await? {
            Some(chunk) => buf.extend_from_slice(&chunk),
            None => break,
        }
    }
    Ok(String::from_utf8_lossy(&buf).chars().take(chars).collect())
}
