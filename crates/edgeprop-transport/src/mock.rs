//! Scripted transport for tests
//!
//! Replays a queue of canned replies and records every request it saw, so
//! tests can assert on call order and payloads without a network.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::CallContext;
use crate::error::{TransportError, TransportResult};
use crate::gateway::{ApiRequest, ApiResponse, Transport};

/// One recorded request
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub request: ApiRequest,
    pub context: CallContext,
}

/// Transport that replays scripted replies in order
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<TransportResult<ApiResponse>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with the given status and JSON body
    pub fn push_ok(&self, status: u16, body: Value) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse { status, body }));
    }

    /// Queue a no-response failure
    pub fn push_no_response(&self) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Err(TransportError::NoResponse("scripted".to_string())));
    }

    /// Requests seen so far, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Paths of all requests seen so far
    pub fn paths(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.request.path.clone())
            .collect()
    }

    /// Number of requests seen so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest, ctx: &CallContext) -> TransportResult<ApiResponse> {
        self.calls.lock().unwrap().push(RecordedCall {
            request: request.clone(),
            context: ctx.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("scripted transport exhausted at {}", request.path))
    }
}
