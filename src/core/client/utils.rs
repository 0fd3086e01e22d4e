//! Utility functions for the control-plane client.

use std::time::Duration;

#[inline]
pub fn is_transient_status(status: u16, transient: &[u16]) -> bool {
    transient.contains(&status)
}

pub fn is_access_denied_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}

/// `base_ms * 2^attempt`, with the exponent capped at 10.
pub fn exponential_backoff(attempt: u32, base_ms: u64) -> Duration {
    let delay_ms = base_ms.saturating_mul(2_u64.pow(attempt.min(10)));
    Duration::from_millis(delay_ms)
}

/// Fresh correlation identifier for `opc-request-id`.
pub fn new_correlation_id() -> String {
    uuid::Uuid::new_v4().simple().to_string().to_uppercase()
}

pub async fn sleep(duration: Duration) {
    tokio::time::sleep(duration).await;
}
