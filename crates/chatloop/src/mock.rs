//! Queue-based test doubles for the gateway and the tool client.
//!
//! [`MockGateway`] and [`MockToolClient`] let tests script exactly what
//! the collaborators return, without touching the network, and record
//! every call for later assertion. Available in unit tests and, with
//! the `test-utils` feature, to downstream crates.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use serde_json::Value;

use crate::chat::Message;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::tool::{ToolClient, ToolDescriptor, ToolError};

/// A queue-based mock LLM gateway.
///
/// Push replies with [`queue_reply`](Self::queue_reply) and errors with
/// [`queue_error`](Self::queue_error); each `send` pops from the front.
/// Every call records its full outbound history for assertion via
/// [`recorded_calls`](Self::recorded_calls).
///
/// # Panics
///
/// `send` panics when the queue is empty — a test scripting bug.
#[derive(Debug, Default)]
pub struct MockGateway {
    replies: Mutex<VecDeque<Result<String, GatewayError>>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockGateway {
    /// Creates a mock with empty queues.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a successful reply.
    pub fn queue_reply(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .expect("mock mutex poisoned")
            .push_back(Ok(text.into()));
    }

    /// Enqueues a failure.
    pub fn queue_error(&self, error: GatewayError) {
        self.replies
            .lock()
            .expect("mock mutex poisoned")
            .push_back(Err(error));
    }

    /// The outbound histories of every `send` so far, in call order.
    pub fn recorded_calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().expect("mock mutex poisoned").clone()
    }

    /// How many times `send` was called.
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock mutex poisoned").len()
    }
}

impl Gateway for MockGateway {
    async fn send(&self, history: &[Message]) -> Result<String, GatewayError> {
        self.calls
            .lock()
            .expect("mock mutex poisoned")
            .push(history.to_vec());
        self.replies
            .lock()
            .expect("mock mutex poisoned")
            .pop_front()
            .expect("MockGateway reply queue is empty")
    }
}

/// A scripted mock tool client.
///
/// The catalog is fixed at construction ([`with_tools`](Self::with_tools)
/// or [`failing_catalog`](Self::failing_catalog)); per-call results are
/// queued with [`queue_result`](Self::queue_result) /
/// [`queue_failure`](Self::queue_failure) and popped in call order.
///
/// # Panics
///
/// `call_tool` panics when the result queue is empty.
#[derive(Debug)]
pub struct MockToolClient {
    catalog: Result<Vec<ToolDescriptor>, ToolError>,
    results: Mutex<VecDeque<Result<String, ToolError>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl Default for MockToolClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockToolClient {
    /// Creates a mock with an empty catalog.
    pub fn new() -> Self {
        Self::with_tools(Vec::new())
    }

    /// Creates a mock whose listing returns the given tools.
    pub fn with_tools(tools: Vec<ToolDescriptor>) -> Self {
        Self {
            catalog: Ok(tools),
            results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock whose listing fails with the given error.
    pub fn failing_catalog(error: ToolError) -> Self {
        Self {
            catalog: Err(error),
            results: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Enqueues a successful call result.
    pub fn queue_result(&self, text: impl Into<String>) {
        self.results
            .lock()
            .expect("mock mutex poisoned")
            .push_back(Ok(text.into()));
    }

    /// Enqueues a call failure.
    pub fn queue_failure(&self, error: ToolError) {
        self.results
            .lock()
            .expect("mock mutex poisoned")
            .push_back(Err(error));
    }

    /// Every `(name, arguments)` pair passed to `call_tool`, in order.
    pub fn recorded_calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("mock mutex poisoned").clone()
    }
}

impl ToolClient for MockToolClient {
    fn list_tools(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<ToolDescriptor>, ToolError>> + Send + '_>> {
        let catalog = self.catalog.clone();
        Box::pin(async move { catalog })
    }

    fn call_tool<'a>(
        &'a self,
        name: &'a str,
        arguments: Value,
    ) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + 'a>> {
        self.calls
            .lock()
            .expect("mock mutex poisoned")
            .push((name.to_string(), arguments));
        let result = self
            .results
            .lock()
            .expect("mock mutex poisoned")
            .pop_front()
            .expect("MockToolClient result queue is empty");
        Box::pin(async move { result })
    }
}
