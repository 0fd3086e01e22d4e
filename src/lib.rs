//! ctlplane: declarative HTTP request/response layer for cloud control-plane APIs.
//!
//! This crate consolidates the pieces needed to invoke control-plane
//! operations:
//!
//! - **core**: operation descriptors, the request builder, the response
//!   parser, optimistic concurrency and the retry engine.
//! - **identity**: policy operations declared on top of the core.
//! - **paths**: where configuration lives on disk.
//!
//! # Quick Start
//!
//! ```no_run
//! use ctlplane::identity::DeletePolicyRequest;
//! use ctlplane::{ClientConfig, ControlPlaneClient, ControlPlaneError};
//!
//! # async fn run() -> ctlplane::Result<()> {
//! let config = ClientConfig::load().await?.with_endpoint("https://identity.example.com/20160918");
//! let client = ControlPlaneClient::new(config)?;
//!
//! let request = DeletePolicyRequest::new("ocid1.policy.oc1..aaaa").with_if_match("etag-7");
//! match client.call(&request).await {
//!     Ok(response) => println!("deleted, request id {:?}", response.opc_request_id),
//!     Err(ControlPlaneError::PreconditionFailed { .. }) => println!("policy changed, re-read it"),
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod identity;
pub mod paths;

// Top-level re-exports for common usage
pub use crate::core::error::{
    BuildError, CancelReason, ControlPlaneError, ParseError, Result, ServiceError,
};
pub use crate::core::traits::Transport;
pub use crate::core::{client, protocol, types};
pub use crate::core::types::{
    Operation, OperationRequest, OperationResponse, ParsedResponse, RequestMetadata, WireRequest,
    WireResponse,
};

pub use crate::core::client::{ClientConfig, ControlPlaneClient, RetryPolicy};
#[cfg(feature = "client")]
pub use crate::core::client::ReqwestTransport;
