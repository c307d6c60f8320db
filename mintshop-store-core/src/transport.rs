//! Transport: one remote call in, one decoded envelope out
//!
//! GET requests carry their parameters in the query string, built verbatim:
//! `key=value` pairs in insertion order joined with `&`, no percent-encoding,
//! and no `?` at all when there are no parameters. POST requests send the
//! parameters as a JSON object body.
//!
//! Callers only ever see the decoded body. Status codes and headers stay
//! inside the transport; a non-2xx status or a connection failure comes back
//! as the underlying client error, unchanged. There is no retry and no
//! timeout beyond the HTTP client's own defaults.

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::envelope::Envelope;

/// HTTP method of a remote call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Ordered flat parameter set
///
/// Iteration order is insertion order. Values are plain strings; nested or
/// array values are not representable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a parameter (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    /// Append a parameter
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.0.push((key.into(), value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as `k1=v1&k2=v2`, no encoding, no trailing separator
    pub fn query_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// JSON object body for POST requests
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Value::Object(map)
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.push(k, v);
        }
        params
    }
}

/// Append the query string to `path`; the path is returned unmodified when
/// there are no parameters.
pub fn query_url(path: &str, params: &Params) -> String {
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, params.query_string())
    }
}

/// Transport-level failure
#[derive(Debug, Error)]
pub enum TransportError {
    /// Error from the HTTP client (connection, non-2xx status), passed through as-is
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// Connection failure reported by a non-HTTP transport
    #[error("connection failed: {0}")]
    Connection(String),

    /// The body was not a valid envelope
    #[error("malformed response body: {0}")]
    Body(#[from] serde_json::Error),
}

/// A single remote call
///
/// Implementations must not retry and must not add a timeout.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(
        &self,
        path: &str,
        params: &Params,
        method: Method,
    ) -> Result<Envelope, TransportError>;
}

/// `reqwest`-backed transport rooted at a base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport; `base_url` is prepended verbatim to every path.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        path: &str,
        params: &Params,
        method: Method,
    ) -> Result<Envelope, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        let request = match method {
            Method::Get => self.client.get(query_url(&url, params)),
            Method::Post => self.client.post(&url).json(&params.to_json()),
        };

        tracing::debug!(%method, %url, "sending request");
        let response = request.send().await?.error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
