//! Test Invoker: one test call, normalized into a [`TestOutcome`].
//!
//! The invoker never fails. Transport errors, non-2xx replies and
//! application-level rejections all come back as an unsuccessful outcome so
//! the caller only has one result type to render. It does not retry; a new
//! attempt is always an explicit operator action.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::messages::{RegistryReply, TestOutcome, TestParameters, ToolId};
use crate::transport::ToolBackend;

/// Message shown for a success reply without its own message.
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Tool test passed";

/// Message shown for a rejection reply without its own message.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Tool test did not pass";

/// Issues test calls against a [`ToolBackend`].
#[derive(Debug)]
pub struct TestInvoker<B> {
    backend: Arc<B>,
}

impl<B> Clone for TestInvoker<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: ToolBackend> TestInvoker<B> {
    /// Create an invoker sharing the given backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Run the tool once with already-validated parameters.
    pub async fn invoke(&self, tool_id: &ToolId, params: &TestParameters) -> TestOutcome {
        debug!("Invoking tool {} with parameters {}", tool_id, params);

        let outcome = match self.backend.test_tool(tool_id, params).await {
            Ok(reply) => outcome_from_reply(reply),
            Err(err) => outcome_from_transport_error(err),
        };

        if outcome.is_success() {
            info!("Tool {} test succeeded", tool_id);
        } else {
            warn!(
                "Tool {} test failed: {}",
                tool_id,
                outcome.message.as_deref().unwrap_or("no message")
            );
        }
        outcome
    }
}

/// Classify a decoded 2xx reply.
pub fn outcome_from_reply(reply: RegistryReply) -> TestOutcome {
    if reply.is_success() {
        let message = reply
            .success_message()
            .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
        TestOutcome::succeeded(Some(message), reply.data)
    } else {
        let message = reply
            .failure_message()
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        TestOutcome::rejected(Some(message), reply.data)
    }
}

/// Classify a transport failure.
pub fn outcome_from_transport_error(err: TransportError) -> TestOutcome {
    match err {
        TransportError::HttpStatus { status } => TestOutcome::http_error(status),
        other => TestOutcome::transport_error(other.to_string()),
    }
}
