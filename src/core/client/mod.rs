//! Control-plane client implementation.
//!
//! # Module Organization
//!
//! ```text
//! client/
//! ├── fetch          - ControlPlaneClient: prepare, execute, call
//! ├── retry          - RetryPolicy and the per-call retry state machine
//! ├── native_network - reqwest-backed Transport
//! ├── config         - Client configuration
//! └── utils          - Utility functions
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ControlPlaneClient`] | Builds, sends, retries and parses operations |
//! | [`RetryPolicy`] | `should_retry`, `backoff` and an attempt budget |
//! | [`ClientConfig`] | Client configuration options |
//!
//! # Examples
//!
//! ```
//! use ctlplane::client::{ClientConfig, RetryPolicy};
//! use std::time::Duration;
//!
//! let config = ClientConfig {
//!     max_attempts: 5,
//!     retry_delay_ms: 200,
//!     ..Default::default()
//! };
//! assert_eq!(config.retry_policy().backoff(2), Duration::from_millis(400));
//!
//! // Per-call override: never retry.
//! let policy = RetryPolicy::no_retry();
//! assert_eq!(policy.max_attempts(), 1);
//! ```

pub mod config;
pub mod fetch;
#[cfg(feature = "client")]
pub mod native_network;
pub mod retry;
pub mod utils;

pub use config::ClientConfig;
pub use fetch::ControlPlaneClient;
#[cfg(feature = "client")]
pub use native_network::ReqwestTransport;
pub use retry::{
    transient_classifier, Attempt, BackoffFn, RetryDecision, RetryPolicy, RetryState,
    ShouldRetryFn,
};
