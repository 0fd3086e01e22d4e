//! Main control-plane client implementation.
//!
//! [`ControlPlaneClient`] turns a typed request into a wire request, runs it
//! through the retry engine and parses the final response.

#[cfg(feature = "client")]
use crate::core::client::native_network::ReqwestTransport;
use crate::core::client::retry::{RetryDecision, RetryPolicy, RetryState};
use crate::core::client::{config::ClientConfig, utils};
use crate::core::error::{CancelReason, ControlPlaneError, Result};
use crate::core::protocol::{self, attach_precondition, headers, service_error};
use crate::core::traits::Transport;
use crate::core::types::{
    OperationRequest, OperationResponse, RequestMetadata, WireRequest, WireResponse,
};
use std::future::Future;
use std::sync::Arc;

/// The control-plane client.
///
/// Cheap to clone; clones share the transport, configuration and default
/// retry policy.
#[derive(Clone)]
pub struct ControlPlaneClient {
    network: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
    default_retry: Arc<RetryPolicy>,
}

impl ControlPlaneClient {
    /// Create a client that talks HTTP through `reqwest`.
    #[cfg(feature = "client")]
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let network = ReqwestTransport::from_config(&config)?;
        Ok(Self::with_transport(config, Arc::new(network)))
    }

    /// Create a client over any [`Transport`].
    ///
    /// The process-wide default retry policy is derived from `config`.
    pub fn with_transport(config: ClientConfig, network: Arc<dyn Transport>) -> Self {
        let default_retry = Arc::new(config.retry_policy());
        ControlPlaneClient {
            network,
            config: Arc::new(config),
            default_retry,
        }
    }

    /// Replace the default retry policy used by calls without an override.
    #[must_use]
    pub fn with_default_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.default_retry = Arc::new(policy);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn default_retry_policy(&self) -> &RetryPolicy {
        &self.default_retry
    }

    pub fn network(&self) -> &Arc<dyn Transport> {
        &self.network
    }

    /// Render `request` without sending it.
    ///
    /// Builds the wire request, attaches the concurrency token and, when
    /// `auto_correlation_id` is on and the caller supplied none, a fresh
    /// correlation identifier.
    pub fn prepare<R>(&self, request: &R) -> Result<WireRequest>
    where
        R: OperationRequest + ?Sized,
    {
        let metadata = request.metadata();
        let wire = protocol::build(request.operation(), request, metadata)?;
        let mut wire = attach_precondition(wire, request.concurrency_token())?;

        if metadata.correlation_id.is_none() && self.config.auto_correlation_id {
            wire.set_header(headers::OPC_REQUEST_ID, utils::new_correlation_id());
        }
        Ok(wire)
    }

    /// Send `wire` under the retry policy in effect for `metadata`.
    ///
    /// Attempts are strictly sequential. The same request, correlation
    /// identifier included, is sent on every attempt. Returns the last
    /// response of any status when the policy stops, or
    /// [`ControlPlaneError::ExhaustedRetries`] when the budget runs out while
    /// the policy still asks for more.
    pub async fn execute(&self, wire: &WireRequest, metadata: &RequestMetadata) -> Result<WireResponse> {
        let policy = metadata.effective_retry_policy(&self.default_retry);
        let mut state = RetryState::new(policy);

        loop {
            check_cancelled(metadata)?;
            let attempt = state.begin_attempt();
            tracing::debug!(
                method = %wire.method,
                target = %wire.target(),
                attempt,
                "sending request"
            );

            let result = guarded(metadata, self.network.send(wire)).await?;

            match state.decide(&result) {
                RetryDecision::Stop => return result,
                RetryDecision::Exhausted => {
                    if self.config.enable_logging {
                        tracing::warn!("Request {} gave up after {} attempts", wire.target(), state.attempts);
                    }
                    return Err(ControlPlaneError::ExhaustedRetries {
                        attempts: state.attempts,
                        last: Box::new(result),
                    });
                }
                RetryDecision::Retry(delay) => {
                    if self.config.enable_logging {
                        match &result {
                            Ok(response) => tracing::warn!(
                                "Request returned {} (attempt {}), retrying after {:?}",
                                response.status,
                                attempt,
                                delay
                            ),
                            Err(e) => tracing::warn!(
                                "Request failed (attempt {}), retrying after {:?}: {}",
                                attempt,
                                delay,
                                e
                            ),
                        }
                    }
                    guarded(metadata, utils::sleep(delay)).await?;
                }
            }
        }
    }

    /// Invoke an operation: build, send with retries, classify and parse.
    ///
    /// A 412 surfaces as [`ControlPlaneError::PreconditionFailed`] and any
    /// other non-success status as [`ControlPlaneError::Service`].
    pub async fn call<R>(&self, request: &R) -> Result<R::Response>
    where
        R: OperationRequest + ?Sized,
    {
        let operation = request.operation();
        let wire = self.prepare(request)?;
        let response = self.execute(&wire, request.metadata()).await?;

        if !response.is_success() {
            let err = service_error(&response);
            tracing::debug!(operation = operation.name, status = response.status, "call failed: {err}");
            return Err(err);
        }

        let parsed = protocol::parse::<<R::Response as OperationResponse>::Body>(response, operation)?;
        Ok(R::Response::from_parsed(parsed))
    }
}

fn check_cancelled(metadata: &RequestMetadata) -> Result<()> {
    if metadata
        .cancellation
        .as_ref()
        .is_some_and(|token| token.is_cancelled())
    {
        return Err(ControlPlaneError::Cancelled(CancelReason::Signal));
    }
    if metadata
        .deadline
        .is_some_and(|deadline| tokio::time::Instant::now() >= deadline)
    {
        return Err(ControlPlaneError::Cancelled(CancelReason::Deadline));
    }
    Ok(())
}

/// Run `fut` unless the call is cancelled or its deadline passes first.
///
/// Cancellation wins over the deadline, and both win over a future that
/// becomes ready at the same instant.
async fn guarded<F>(metadata: &RequestMetadata, fut: F) -> Result<F::Output>
where
    F: Future,
{
    let cancelled = async {
        match &metadata.cancellation {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };
    let deadline = async {
        match metadata.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancelled => Err(ControlPlaneError::Cancelled(CancelReason::Signal)),
        _ = deadline => Err(ControlPlaneError::Cancelled(CancelReason::Deadline)),
        output = fut => Ok(output),
    }
}
