//! Forwarding error definitions.

use thiserror::Error;

/// The forward payload was rejected before any network I/O.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("request body is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

/// The outbound call could not be made or did not complete.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Host and path do not form a usable URL.
    #[error("invalid target URL `{url}`: {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("timed out contacting {url}")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to connect to {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} failed")]
    Upstream {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ForwardError {
    /// Sort a reqwest failure into timeout, connect, or other.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        let url = url.to_string();
        if source.is_timeout() {
            ForwardError::Timeout { url, source }
        } else if source.is_connect() {
            ForwardError::Connect { url, source }
        } else {
            ForwardError::Upstream { url, source }
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            ForwardError::Client(_) | ForwardError::InvalidTarget { .. } => "rejected",
            ForwardError::Timeout { .. } => "timeout",
            ForwardError::Connect { .. } => "connect_error",
            ForwardError::Upstream { .. } => "upstream_error",
        }
    }
}
