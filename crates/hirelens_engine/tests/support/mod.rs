#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use hirelens_engine::{Transport, TransportError, TransportMessage};
use serde_json::{json, Value};

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(hirelens_logging::initialize_for_tests);
}

/// Scripted in-memory transport. Clones share the same call log and inbox,
/// so a test keeps one clone to drive and inspect the other.
#[derive(Clone, Default)]
pub struct FakeTransport {
    calls: Arc<Mutex<Vec<String>>>,
    inbox: Arc<Mutex<VecDeque<Result<TransportMessage, TransportError>>>>,
    refuse_connect: Arc<Mutex<bool>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refuse_connections(&self) {
        *self.refuse_connect.lock().unwrap() = true;
    }

    pub fn push(&self, destination: &str, body: impl Into<String>) {
        self.inbox.lock().unwrap().push_back(Ok(TransportMessage {
            destination: destination.to_string(),
            body: body.into(),
        }));
    }

    pub fn push_error(&self, err: TransportError) {
        self.inbox.lock().unwrap().push_back(Err(err));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait::async_trait]
impl Transport for FakeTransport {
    async fn connect(&mut self) -> Result<(), TransportError> {
        self.record("connect");
        if *self.refuse_connect.lock().unwrap() {
            return Err(TransportError::Connect("connection refused".into()));
        }
        Ok(())
    }

    async fn subscribe(&mut self, destination: &str) -> Result<(), TransportError> {
        self.record(format!("subscribe {destination}"));
        Ok(())
    }

    // An empty inbox reads as the server closing the channel.
    async fn next_message(&mut self) -> Option<Result<TransportMessage, TransportError>> {
        self.inbox.lock().unwrap().pop_front()
    }

    async fn disconnect(&mut self) -> Result<(), TransportError> {
        self.record("disconnect");
        Ok(())
    }
}

pub fn status_envelope(payload: Value) -> String {
    json!({ "type": "STATUS", "payload": payload }).to_string()
}

pub fn result_envelope(payload: Value) -> String {
    json!({ "type": "CHART_MAP", "payload": payload }).to_string()
}

pub fn downloading(remotive: u64, adzuna: u64) -> Value {
    json!({
        "updatingDataWindowVisible": true,
        "downloadingData": true,
        "downloadedOffersNumber": remotive + adzuna,
        "remotiveCount": remotive,
        "remoteOkCount": 0,
        "adzunaCount": adzuna,
        "joinriseCount": 0,
        "processingByAI": false,
        "processedByAINumber": 0,
        "savedToDatabase": false,
        "cancelled": false,
        "errorMessage": ""
    })
}
