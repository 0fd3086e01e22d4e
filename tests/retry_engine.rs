mod common;

use common::{client, ScriptedTransport, Step};
use ctlplane::identity::DeletePolicyRequest;
use ctlplane::types::WireResponse;
use ctlplane::{CancelReason, ControlPlaneError, RequestMetadata, RetryPolicy};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn delete(metadata: RequestMetadata) -> DeletePolicyRequest {
    DeletePolicyRequest::new("p-1").with_metadata(metadata)
}

#[tokio::test(start_paused = true)]
async fn test_two_transient_failures_then_success() {
    let transport = ScriptedTransport::new([Step::status(503), Step::TransportError("connection reset")]);
    let policy = RetryPolicy::exponential(3, Duration::from_millis(100), Duration::from_secs(10));
    let backoffs = policy.backoff(1) + policy.backoff(2);

    let start = Instant::now();
    let response = client(transport.clone())
        .call(&delete(RequestMetadata::new().with_retry_policy(policy)))
        .await
        .unwrap();

    assert_eq!(response.raw_response.status, 200);
    assert_eq!(transport.attempts(), 3);
    assert!(start.elapsed() >= backoffs);

    let times = transport.send_times();
    assert!(times[1] - times[0] >= Duration::from_millis(100));
    assert!(times[2] - times[1] >= Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_budget_exhausted_reports_last_result() {
    let transport = ScriptedTransport::new([Step::status(503), Step::status(502), Step::status(500)]);
    let err = client(transport.clone())
        .call(&delete(
            RequestMetadata::new().with_retry_policy(RetryPolicy::fixed(3, Duration::from_secs(1))),
        ))
        .await
        .unwrap_err();

    assert_eq!(transport.attempts(), 3);
    match err {
        ControlPlaneError::ExhaustedRetries { attempts, last } => {
            assert_eq!(attempts, 3);
            assert!(matches!(*last, Ok(ref response) if response.status == 500));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_precondition_failure_is_never_retried() {
    let transport = ScriptedTransport::new([Step::Respond(
        WireResponse::new(412, r#"{"code":"NoEtagMatch","message":"etag mismatch"}"#)
            .with_header("opc-request-id", "srv-1"),
    )]);
    let greedy = RetryPolicy::fixed(5, Duration::from_millis(10)).with_should_retry(|_| true);

    let err = client(transport.clone())
        .call(&delete(RequestMetadata::new().with_retry_policy(greedy)).with_if_match("etag-7"))
        .await
        .unwrap_err();

    assert_eq!(transport.attempts(), 1);
    assert!(err.is_precondition_failed());
    assert_eq!(err.request_id(), Some("srv-1"));
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_budget() {
    let transport = ScriptedTransport::new([Step::status(503), Step::status(503)]);
    let err = client(transport.clone())
        .call(&delete(
            RequestMetadata::new().with_retry_policy(RetryPolicy::default().with_max_attempts(1)),
        ))
        .await
        .unwrap_err();

    assert_eq!(transport.attempts(), 1);
    assert!(matches!(err, ControlPlaneError::ExhaustedRetries { attempts: 1, .. }));
}

#[tokio::test(start_paused = true)]
async fn test_no_retry_policy_surfaces_service_error() {
    let transport = ScriptedTransport::new([Step::status(503)]);
    let err = client(transport.clone())
        .call(&delete(RequestMetadata::new().with_retry_policy(RetryPolicy::no_retry())))
        .await
        .unwrap_err();

    assert_eq!(transport.attempts(), 1);
    assert_eq!(err.status(), Some(503));
}

#[tokio::test(start_paused = true)]
async fn test_non_transient_status_stops_immediately() {
    let transport = ScriptedTransport::new([Step::status(404)]);
    let err = client(transport.clone())
        .call(&delete(RequestMetadata::new()))
        .await
        .unwrap_err();

    assert_eq!(transport.attempts(), 1);
    assert!(matches!(err, ControlPlaneError::Service(ref e) if e.status == 404));
}

#[tokio::test(start_paused = true)]
async fn test_policy_that_retries_success_exhausts() {
    let transport = ScriptedTransport::new(Vec::<Step>::new());
    let policy = RetryPolicy::new(2, |_| true, |_| Duration::from_millis(5));
    let err = client(transport.clone())
        .call(&delete(RequestMetadata::new().with_retry_policy(policy)))
        .await
        .unwrap_err();

    assert_eq!(transport.attempts(), 2);
    match err {
        ControlPlaneError::ExhaustedRetries { last, .. } => assert!(last.is_ok()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_client_default_policy_applies_without_override() {
    let transport = ScriptedTransport::new([Step::Timeout, Step::Timeout]);
    let client = client(transport.clone())
        .with_default_retry_policy(RetryPolicy::fixed(3, Duration::from_millis(50)));

    client.call(&delete(RequestMetadata::new())).await.unwrap();
    assert_eq!(transport.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_override_replaces_client_default() {
    let transport = ScriptedTransport::new([Step::Timeout, Step::Timeout]);
    let client = client(transport.clone()).with_default_retry_policy(RetryPolicy::no_retry());

    client
        .call(&delete(
            RequestMetadata::new().with_retry_policy(RetryPolicy::fixed(3, Duration::ZERO)),
        ))
        .await
        .unwrap();
    assert_eq!(transport.attempts(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_retry_after_header_lengthens_wait() {
    let transport = ScriptedTransport::new([Step::Respond(
        WireResponse::new(429, "").with_header("Retry-After", "5"),
    )]);
    let policy = RetryPolicy::fixed(2, Duration::from_secs(1));

    client(transport.clone())
        .call(&delete(RequestMetadata::new().with_retry_policy(policy)))
        .await
        .unwrap();

    let times = transport.send_times();
    assert_eq!(times.len(), 2);
    assert!(times[1] - times[0] >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn test_same_correlation_id_on_every_attempt() {
    let transport = ScriptedTransport::new([Step::status(500), Step::status(500)]);
    client(transport.clone())
        .call(&delete(
            RequestMetadata::new().with_retry_policy(RetryPolicy::fixed(3, Duration::from_millis(1))),
        ))
        .await
        .unwrap();

    let ids: Vec<_> = transport
        .requests()
        .iter()
        .map(|r| r.header("opc-request-id").map(str::to_string))
        .collect();
    assert_eq!(ids.len(), 3);
    assert!(ids[0].is_some());
    assert!(ids.iter().all(|id| id == &ids[0]));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff() {
    let transport = ScriptedTransport::new([Step::status(503), Step::status(503)]);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let err = client(transport.clone())
        .call(&delete(
            RequestMetadata::new()
                .with_retry_policy(RetryPolicy::fixed(3, Duration::from_secs(10)))
                .with_cancellation(token),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, ControlPlaneError::Cancelled(CancelReason::Signal)));
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_attempt() {
    let transport = ScriptedTransport::new([Step::Hang]);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let err = client(transport.clone())
        .call(&delete(RequestMetadata::new().with_cancellation(token)))
        .await
        .unwrap_err();

    assert!(matches!(err, ControlPlaneError::Cancelled(CancelReason::Signal)));
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_during_backoff() {
    let transport = ScriptedTransport::new([Step::status(503)]);
    let deadline = Instant::now() + Duration::from_secs(2);

    let err = client(transport.clone())
        .call(&delete(
            RequestMetadata::new()
                .with_retry_policy(RetryPolicy::fixed(5, Duration::from_secs(10)))
                .with_deadline(deadline),
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, ControlPlaneError::Cancelled(CancelReason::Deadline)));
    assert_eq!(transport.attempts(), 1);
    assert!(Instant::now() < deadline + Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_deadline_during_attempt() {
    let transport = ScriptedTransport::new([Step::Hang]);
    let deadline = Instant::now() + Duration::from_millis(500);

    let err = client(transport.clone())
        .call(&delete(RequestMetadata::new().with_deadline(deadline)))
        .await
        .unwrap_err();

    assert!(matches!(err, ControlPlaneError::Cancelled(CancelReason::Deadline)));
    assert_eq!(transport.attempts(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_elapsed_deadline_makes_no_attempt() {
    let transport = ScriptedTransport::new(Vec::<Step>::new());
    let deadline = Instant::now();
    tokio::time::advance(Duration::from_millis(1)).await;

    let err = client(transport.clone())
        .call(&delete(RequestMetadata::new().with_deadline(deadline)))
        .await
        .unwrap_err();

    assert!(matches!(err, ControlPlaneError::Cancelled(CancelReason::Deadline)));
    assert_eq!(transport.attempts(), 0);
}
