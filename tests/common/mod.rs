//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use ctlplane::types::{WireRequest, WireResponse};
use ctlplane::{ClientConfig, ControlPlaneClient, ControlPlaneError, Result, Transport};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// One scripted transport outcome.
#[derive(Clone, Debug)]
pub enum Step {
    Respond(WireResponse),
    TransportError(&'static str),
    Timeout,
    /// Never completes.
    Hang,
}

impl Step {
    pub fn status(status: u16) -> Self {
        Step::Respond(WireResponse::new(status, ""))
    }
}

/// Transport replaying a fixed script, recording every attempt.
///
/// Once the script runs out every further attempt answers 200 with an empty body.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    attempts: AtomicU32,
    sent: Mutex<Vec<(Instant, WireRequest)>>,
}

impl ScriptedTransport {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        Arc::new(ScriptedTransport {
            script: Mutex::new(steps.into_iter().collect()),
            ..Default::default()
        })
    }

    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<WireRequest> {
        self.sent.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    pub fn send_times(&self) -> Vec<Instant> {
        self.sent.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &WireRequest) -> Result<WireResponse> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((Instant::now(), request.clone()));

        let step = self.script.lock().unwrap().pop_front();
        match step {
            None => Ok(WireResponse::new(200, "")),
            Some(Step::Respond(response)) => Ok(response),
            Some(Step::TransportError(message)) => Err(ControlPlaneError::Transport(message.into())),
            Some(Step::Timeout) => Err(ControlPlaneError::Timeout),
            Some(Step::Hang) => std::future::pending().await,
        }
    }
}

pub fn client(transport: Arc<ScriptedTransport>) -> ControlPlaneClient {
    ControlPlaneClient::with_transport(ClientConfig::default(), transport)
}
