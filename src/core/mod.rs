//! Declarative request/response layer for cloud control-plane operations.
//!
//! # Overview
//!
//! Each operation is a static descriptor: an HTTP method, a path template and
//! a list of fields, each placed in the path, the query, a header or the JSON
//! body. The layer turns a typed request into a wire request, sends it with
//! retries, and turns the response back into typed fields.
//!
//! # Modules
//!
//! - [`types`] - Operation descriptors, field values and wire messages
//! - [`protocol`] - Request builder, response parser and `if-match` handling
//! - [`client`] - Retry engine, transports and the client facade
//! - [`error`] - The error taxonomy
//! - [`traits`] - The transport seam

pub mod client;
pub mod error;
pub mod protocol;
pub mod traits;
pub mod types;

pub use error::{
    AttemptResult, BuildError, CancelReason, ControlPlaneError, ParseError, Result, ServiceError,
};
pub use traits::Transport;
pub use types::{
    FieldSource, FieldSpec, FieldValue, Method, Operation, OperationRequest, OperationResponse,
    ParsedResponse, Placement, RequestMetadata, WireRequest, WireResponse,
};

pub use client::{ClientConfig, ControlPlaneClient, RetryPolicy};
#[cfg(feature = "client")]
pub use client::ReqwestTransport;
