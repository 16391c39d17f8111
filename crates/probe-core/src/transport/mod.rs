//! Backend abstraction over the tool registry's HTTP API.
//!
//! The workflow only ever talks to a [`ToolBackend`]; [`HttpBackend`] is the
//! production implementation. Tests substitute scripted backends to control
//! response ordering.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::messages::{RegistryReply, SaveRecordRequest, TestParameters, ToolId};

pub mod config;
#[cfg(feature = "http")]
pub mod http;

pub use config::{AuthConfig, BackendConfig};
#[cfg(feature = "http")]
pub use http::HttpBackend;

/// Header marking calls as programmatic rather than page navigation.
pub const REQUESTED_WITH_HEADER: &str = "x-requested-with";

/// Header carrying the registry session identifier.
pub const SESSION_ID_HEADER: &str = "x-session-id";

/// Registry endpoints used by the test workflow.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// `POST /api/tools/{tool_id}/test` with the parameters as body.
    ///
    /// Non-2xx replies are returned as [`TransportError::HttpStatus`].
    async fn test_tool(
        &self,
        tool_id: &ToolId,
        params: &TestParameters,
    ) -> Result<RegistryReply, TransportError>;

    /// `POST /api/tools/{tool_id}/test/save` with the verified record.
    async fn save_test_record(
        &self,
        tool_id: &ToolId,
        request: &SaveRecordRequest,
    ) -> Result<RegistryReply, TransportError>;

    /// Static description of this backend for logs and status output.
    fn info(&self) -> BackendInfo;
}

/// Description of a backend and its traffic so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendInfo {
    /// Backend kind, e.g. `"http"`
    pub backend_type: String,
    /// Registry base URL
    pub base_url: String,
    /// Whether a registry session id is attached to requests
    pub has_session: bool,
    /// Requests issued
    pub requests_sent: u64,
    /// Requests that ended in a transport error
    pub requests_failed: u64,
}

impl BackendInfo {
    /// Create an info record with zeroed counters.
    pub fn new(backend_type: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            backend_type: backend_type.into(),
            base_url: base_url.into(),
            has_session: false,
            requests_sent: 0,
            requests_failed: 0,
        }
    }
}
