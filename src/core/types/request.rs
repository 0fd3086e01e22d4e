//! Wire requests, per-call metadata and the typed request trait.

use crate::core::client::retry::RetryPolicy;
use crate::core::types::field::FieldSource;
use crate::core::types::operation::{Method, Operation};
use crate::core::types::response::OperationResponse;
use bytes::Bytes;
use std::collections::BTreeMap;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// A fully rendered HTTP request, ready for a transport.
///
/// Header names are stored lowercase and sorted, so two builds of the same
/// input render identically.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireRequest {
    pub method: Method,
    /// Rendered, percent-encoded path.
    pub path: String,
    /// Decoded query pairs in declaration order.
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Bytes>,
}

impl WireRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        WireRequest {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Set a header, replacing any value under the same (case-insensitive) name.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Encoded query string without the leading `?`.
    pub fn query_string(&self) -> String {
        self.query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Request target: path plus query string.
    pub fn target(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query_string())
        }
    }

    /// Canonical HTTP/1.1-style rendering, used to compare builds byte for byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {} HTTP/1.1\r\n", self.method, self.target()).into_bytes();
        for (name, value) in &self.headers {
            out.extend_from_slice(format!("{name}: {value}\r\n").as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        if let Some(body) = &self.body {
            out.extend_from_slice(body);
        }
        out
    }
}

/// Per-call overrides threaded through the builder and the retry engine.
///
/// Nothing here is sent on the wire except the correlation identifier.
#[derive(Clone, Debug, Default)]
pub struct RequestMetadata {
    /// Sent as `opc-request-id`.
    pub correlation_id: Option<String>,
    /// Replaces the client's default retry policy for this call.
    pub retry_policy: Option<RetryPolicy>,
    pub cancellation: Option<CancellationToken>,
    /// The call fails with `Cancelled(Deadline)` once this instant passes.
    pub deadline: Option<Instant>,
}

impl RequestMetadata {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// The per-call policy if set, otherwise `default`.
    pub fn effective_retry_policy<'a>(&'a self, default: &'a RetryPolicy) -> &'a RetryPolicy {
        self.retry_policy.as_ref().unwrap_or(default)
    }
}

/// A typed request value bound to one operation.
///
/// Implementors expose their fields by declared name; the builder never
/// inspects the value any other way.
pub trait OperationRequest: FieldSource {
    type Response: OperationResponse;

    fn operation(&self) -> &'static Operation;

    fn metadata(&self) -> &RequestMetadata;

    /// Entity tag to send as `if-match`.
    fn concurrency_token(&self) -> Option<&str> {
        None
    }
}
