use crate::core::error::Result;
use crate::core::types::{WireRequest, WireResponse};
use async_trait::async_trait;

/// Abstraction for network operations.
///
/// A transport sends one rendered request and reports what came back. Any
/// HTTP status is an `Ok` response; `Err` is reserved for failures to get a
/// response at all. Retries, cancellation and status classification happen
/// above this seam.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse>;
}
