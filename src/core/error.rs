//! Error types for control-plane operations.
//!
//! Every failure mode of the request/response layer is a variant of
//! [`ControlPlaneError`]. The [`Result`] type alias provides a shorthand for
//! operations that may fail.
//!
//! # Error Categories
//!
//! | Category | Variants | Retryable |
//! |----------|----------|-----------|
//! | Local | `Build` | No |
//! | Network | `Transport`, `Timeout`, `Io` | Yes |
//! | Server | `Service` | Transient statuses only |
//! | Concurrency | `PreconditionFailed` | Never |
//! | Decoding | `Parse` | No |
//! | Engine | `ExhaustedRetries`, `Cancelled` | No |
//! | Ambient | `Json`, `Config` | No |
//!
//! # Examples
//!
//! ```
//! use ctlplane::ControlPlaneError;
//!
//! assert!(ControlPlaneError::Timeout.is_retryable());
//! assert!(!ControlPlaneError::PreconditionFailed { request_id: None, message: None }.is_retryable());
//! ```

use crate::core::client::utils::{is_access_denied_status, is_transient_status};
use crate::core::types::WireResponse;
use bytes::Bytes;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for control-plane operations.
pub type Result<T> = std::result::Result<T, ControlPlaneError>;

/// Outcome of a single transport attempt: any HTTP response, or a failure to
/// obtain one.
pub type AttemptResult = std::result::Result<WireResponse, ControlPlaneError>;

/// Status codes treated as transient when no custom set is configured.
///
/// 408 Request Timeout, 429 Too Many Requests, 500 Internal Server Error,
/// 502 Bad Gateway, 503 Service Unavailable, 504 Gateway Timeout.
pub const DEFAULT_TRANSIENT_STATUSES: &[u16] = &[408, 429, 500, 502, 503, 504];

/// HTTP status a server returns when an `if-match` token is stale.
pub const PRECONDITION_FAILED_STATUS: u16 = 412;

/// Local errors raised while rendering a wire request.
///
/// These are produced before any network attempt and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BuildError {
    /// A mandatory field (or a path field) was absent or empty.
    #[error("missing mandatory field: {0}")]
    MissingField(String),

    /// The path template names a placeholder with no declared path field.
    #[error("path template placeholder {{{0}}} has no declared path field")]
    UnknownPlaceholder(String),

    /// A header value cannot be carried on the wire.
    #[error("invalid value for header {name}: {reason}")]
    InvalidHeaderValue { name: String, reason: String },

    /// A field value could not be encoded for its placement.
    #[error("encoding error: {0}")]
    Encoding(String),
}

/// Errors raised when a response does not match its operation's declared shape.
///
/// The unmodified raw response is attached for diagnosis.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    /// The body did not deserialize into the declared shape.
    #[error("response body does not match declared shape: {message}")]
    BodyDecode {
        message: String,
        raw: Box<WireResponse>,
    },

    /// A declared header carried a value of the wrong shape.
    #[error("response header {name} has malformed value {value:?}")]
    HeaderDecode {
        name: String,
        value: String,
        raw: Box<WireResponse>,
    },
}

impl ParseError {
    /// The raw response that failed to parse.
    pub fn raw_response(&self) -> &WireResponse {
        match self {
            ParseError::BodyDecode { raw, .. } | ParseError::HeaderDecode { raw, .. } => raw,
        }
    }
}

/// Why a call was aborted by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The cancellation token was triggered.
    Signal,
    /// The caller-supplied deadline elapsed.
    Deadline,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelReason::Signal => f.write_str("cancellation requested"),
            CancelReason::Deadline => f.write_str("deadline elapsed"),
        }
    }
}

/// A non-success status returned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub status: u16,
    /// Service-specific error code, read from a JSON error body when present.
    pub code: Option<String>,
    pub message: Option<String>,
    /// Server-assigned correlation identifier of the failing request.
    pub request_id: Option<String>,
    pub body: Bytes,
}

impl ServiceError {
    #[inline]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "service returned {}", self.status)?;
        if let Some(code) = &self.code {
            write!(f, " ({code})")?;
        }
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(id) = &self.request_id {
            write!(f, " [request id {id}]")?;
        }
        Ok(())
    }
}

/// Errors that can occur while invoking a control-plane operation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ControlPlaneError {
    /// The request could not be rendered. No network attempt was made.
    #[error("request build failed: {0}")]
    Build(#[from] BuildError),

    /// Connection-level failure (DNS, connect, TLS, reset).
    #[error("transport error: {0}")]
    Transport(String),

    /// The transport gave up waiting for a response.
    #[error("transport timed out")]
    Timeout,

    /// Local I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The server answered with an error status.
    #[error("{0}")]
    Service(Box<ServiceError>),

    /// The supplied concurrency token no longer matches the resource.
    ///
    /// **Never retried.** Callers re-read the resource and retry on their own terms.
    #[error("precondition failed: concurrency token does not match current resource state")]
    PreconditionFailed {
        request_id: Option<String>,
        message: Option<String>,
    },

    /// The response did not match the operation's declared shape.
    #[error("response parse failed: {0}")]
    Parse(#[from] ParseError),

    /// The retry budget was consumed while the policy still asked for more.
    #[error("retries exhausted after {attempts} attempts")]
    ExhaustedRetries {
        attempts: u32,
        last: Box<AttemptResult>,
    },

    /// The caller aborted the call.
    #[error("call cancelled: {0}")]
    Cancelled(CancelReason),

    /// JSON error outside response parsing (config files, request bodies).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid client configuration or unresolved local paths.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<ServiceError> for ControlPlaneError {
    fn from(err: ServiceError) -> Self {
        ControlPlaneError::Service(Box::new(err))
    }
}

impl ControlPlaneError {
    /// Check if this error is transient under the default classification.
    ///
    /// Returns `true` for transport failures, timeouts, I/O errors and service
    /// errors whose status is in [`DEFAULT_TRANSIENT_STATUSES`].
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            ControlPlaneError::Transport(_) | ControlPlaneError::Timeout | ControlPlaneError::Io(_) => {
                true
            }
            ControlPlaneError::Service(err) => {
                is_transient_status(err.status, DEFAULT_TRANSIENT_STATUSES)
            }
            _ => false,
        }
    }

    /// Returns `true` for HTTP 401 (Unauthorized) or 403 (Forbidden).
    #[inline]
    #[must_use]
    pub fn is_access_denied(&self) -> bool {
        matches!(self, ControlPlaneError::Service(err) if is_access_denied_status(err.status))
    }

    #[inline]
    #[must_use]
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, ControlPlaneError::PreconditionFailed { .. })
    }

    /// Server-assigned correlation identifier, when the failure came from a response.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ControlPlaneError::Service(err) => err.request_id.as_deref(),
            ControlPlaneError::PreconditionFailed { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    /// HTTP status of the failing response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ControlPlaneError::Service(err) => Some(err.status),
            ControlPlaneError::PreconditionFailed { .. } => Some(PRECONDITION_FAILED_STATUS),
            ControlPlaneError::Parse(err) => Some(err.raw_response().status),
            _ => None,
        }
    }
}
