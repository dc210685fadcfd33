//! Forward payload parsing.
//!
//! The inbound body describes a second request:
//!
//! ```json
//! {"path": "/x", "method": "POST", "body": {"a": 1}, "headers": {"Host": "example.test"}}
//! ```
//!
//! `path` is required. `method` defaults to GET, `headers` to empty, and the
//! target host to the configured default when no `Host` header is given.
//! Validation order is fixed: shape, then `path`, then the remaining fields,
//! then the method.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::forward::error::PayloadError;

/// Methods the forwarder is willing to issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl ForwardMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ForwardMethod::Get => "GET",
            ForwardMethod::Post => "POST",
            ForwardMethod::Put => "PUT",
            ForwardMethod::Delete => "DELETE",
            ForwardMethod::Patch => "PATCH",
        }
    }

    /// Whether the payload `body` is sent as JSON.
    pub fn carries_body(self) -> bool {
        matches!(self, ForwardMethod::Post | ForwardMethod::Put | ForwardMethod::Patch)
    }

    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            ForwardMethod::Get => reqwest::Method::GET,
            ForwardMethod::Post => reqwest::Method::POST,
            ForwardMethod::Put => reqwest::Method::PUT,
            ForwardMethod::Delete => reqwest::Method::DELETE,
            ForwardMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl FromStr for ForwardMethod {
    type Err = PayloadError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(ForwardMethod::Get),
            "POST" => Ok(ForwardMethod::Post),
            "PUT" => Ok(ForwardMethod::Put),
            "DELETE" => Ok(ForwardMethod::Delete),
            "PATCH" => Ok(ForwardMethod::Patch),
            other => Err(PayloadError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for ForwardMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated description of the outbound request.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    pub target_host: String,
    pub target_path: String,
    pub method: ForwardMethod,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ForwardRequest {
    /// Parse and validate a raw forward payload.
    pub fn from_json(raw: &[u8], default_host: &str) -> Result<Self, PayloadError> {
        let value: Value = serde_json::from_slice(raw).map_err(PayloadError::InvalidJson)?;
        let Value::Object(fields) = value else {
            return Err(PayloadError::NotAnObject);
        };
        Self::from_fields(fields, default_host)
    }

    fn from_fields(mut fields: Map<String, Value>, default_host: &str) -> Result<Self, PayloadError> {
        let target_path = match fields.remove("path") {
            None | Some(Value::Null) => return Err(PayloadError::MissingField("path")),
            Some(Value::String(path)) => path,
            Some(_) => return Err(invalid("path", "expected a string")),
        };

        let method = match fields.remove("method") {
            None | Some(Value::Null) => "GET".to_string(),
            Some(Value::String(method)) => method,
            Some(_) => return Err(invalid("method", "expected a string")),
        };

        let raw_headers = match fields.remove("headers") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(headers)) => headers,
            Some(_) => return Err(invalid("headers", "expected an object")),
        };

        let body = fields.remove("body").filter(|body| !body.is_null());
        let method = method.parse::<ForwardMethod>()?;

        // An exact `Host` key beats any other casing of it.
        let mut exact_host = None;
        let mut other_host = None;
        let mut headers = HeaderMap::with_capacity(raw_headers.len());
        for (name, value) in raw_headers {
            let Value::String(value) = value else {
                return Err(invalid("headers", format!("value of `{name}` must be a string")));
            };
            if name == "Host" && !value.is_empty() {
                exact_host = Some(value.clone());
            } else if name.eq_ignore_ascii_case("host") && !value.is_empty() {
                other_host.get_or_insert_with(|| value.clone());
            }
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| invalid("headers", format!("`{name}`: {e}")))?;
            let header_value = HeaderValue::from_str(&value)
                .map_err(|e| invalid("headers", format!("`{name}`: {e}")))?;
            headers.insert(header_name, header_value);
        }

        let target_host = exact_host.or(other_host);
        if let Some(host) = &target_host {
            let value = HeaderValue::from_str(host)
                .map_err(|e| invalid("headers", format!("`Host`: {e}")))?;
            headers.insert(reqwest::header::HOST, value);
        }

        Ok(Self {
            target_host: target_host.unwrap_or_else(|| default_host.to_string()),
            target_path,
            method,
            headers,
            body,
        })
    }

    /// Plain-HTTP URL of the target; host and path are concatenated as given.
    pub fn target_url(&self) -> String {
        format!("http://{}{}", self.target_host, self.target_path)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> PayloadError {
    PayloadError::InvalidField {
        field,
        reason: reason.into(),
    }
}
