//! Shared mocks for unit tests.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::http::{OutgoingRequest, Pipeline, RawResponse, Transport, TransportError};
use crate::notify::Notifier;
use crate::router::Navigator;
use crate::session::SessionStore;

// =============================================================================
// MockTransport
// =============================================================================

/// Replays scripted outcomes in order and records what was sent. Once the
/// script runs dry every call answers `200` with `{"success": true}`.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<Vec<Result<RawResponse, TransportError>>>,
    sent: Mutex<Vec<OutgoingRequest>>,
}

impl MockTransport {
    pub fn new(script: Vec<Result<RawResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(script), sent: Mutex::new(Vec::new()) })
    }

    pub fn respond(status: u16, body: Value) -> Arc<Self> {
        Self::new(vec![Ok(RawResponse::new(status, Some(body)))])
    }

    pub fn fail(err: TransportError) -> Arc<Self> {
        Self::new(vec![Err(err)])
    }

    pub fn sent(&self) -> Vec<OutgoingRequest> {
        self.sent.lock().expect("mock mutex should lock").clone()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportError> {
        self.sent.lock().expect("mock mutex should lock").push(request);
        let mut script = self.script.lock().expect("mock mutex should lock");
        if script.is_empty() {
            Ok(RawResponse::new(200, Some(serde_json::json!({ "success": true }))))
        } else {
            script.remove(0)
        }
    }
}

// =============================================================================
// RecordingNotifier / RecordingNavigator
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("mock mutex should lock").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify_error(&self, message: &str) {
        self.messages.lock().expect("mock mutex should lock").push(message.to_owned());
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    pushes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pushes(&self) -> Vec<String> {
        self.pushes.lock().expect("mock mutex should lock").clone()
    }
}

impl Navigator for RecordingNavigator {
    fn push(&self, path: &str) {
        self.pushes.lock().expect("mock mutex should lock").push(path.to_owned());
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub pipeline: Pipeline,
    pub transport: Arc<MockTransport>,
    pub notifier: Arc<RecordingNotifier>,
    pub navigator: Arc<RecordingNavigator>,
    pub session: SessionStore,
}

/// Pipeline with an empty prefix wired to recording ports.
pub fn harness(transport: Arc<MockTransport>) -> Harness {
    let session = SessionStore::in_memory();
    let notifier = RecordingNotifier::new();
    let navigator = RecordingNavigator::new();
    let pipeline = Pipeline::new("", transport.clone(), session.clone(), notifier.clone(), navigator.clone());
    Harness { pipeline, transport, notifier, navigator, session }
}
