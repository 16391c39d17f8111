//! HTTP backend for the tool registry.
//!
//! Uses a single pooled `reqwest` client for both endpoints. Default headers
//! (programmatic-request marker, session id, custom headers) are baked into
//! the client at construction time.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use tracing::{debug, warn};

use super::{
    AuthConfig, BackendConfig, BackendInfo, ToolBackend, REQUESTED_WITH_HEADER,
    SESSION_ID_HEADER,
};
use crate::error::TransportError;
use crate::messages::{RegistryReply, SaveRecordRequest, TestParameters, ToolId};

/// Registry backend speaking JSON over HTTP.
pub struct HttpBackend {
    config: BackendConfig,
    client: Client,
    requests_sent: AtomicU64,
    requests_failed: AtomicU64,
}

impl HttpBackend {
    /// Create a backend from configuration.
    pub fn new(config: BackendConfig) -> Result<Self, TransportError> {
        let client = Self::build_http_client(&config)?;

        Ok(Self {
            config,
            client,
            requests_sent: AtomicU64::new(0),
            requests_failed: AtomicU64::new(0),
        })
    }

    /// Backend configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn build_http_client(config: &BackendConfig) -> Result<Client, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            HeaderName::from_static(REQUESTED_WITH_HEADER),
            HeaderValue::from_static("XMLHttpRequest"),
        );

        if let Some(session_id) = &config.session_id {
            headers.insert(
                HeaderName::from_static(SESSION_ID_HEADER),
                header_value(SESSION_ID_HEADER, session_id)?,
            );
        }

        for (key, value) in &config.headers {
            let name = key
                .parse::<HeaderName>()
                .map_err(|e| TransportError::InvalidConfig {
                    reason: format!("invalid header name '{}': {}", key, e),
                })?;
            headers.insert(name, header_value(key, value)?);
        }

        Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| TransportError::InvalidConfig {
                reason: format!("failed to build HTTP client: {}", e),
            })
    }

    /// `{base}/api/tools/{tool_id}/test[/extra…]`
    fn tool_test_url(&self, tool_id: &ToolId, extra: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidConfig {
                reason: format!("'{}' cannot be used as a base URL", self.config.base_url),
            })?
            .pop_if_empty()
            .extend(["api", "tools", tool_id.as_str(), "test"])
            .extend(extra);
        Ok(url)
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.auth {
            Some(AuthConfig::Bearer { token }) => request.bearer_auth(token),
            Some(AuthConfig::Basic { username, password }) => {
                request.basic_auth(username, password.as_ref())
            }
            None => request,
        }
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
    ) -> Result<RegistryReply, TransportError> {
        self.requests_sent.fetch_add(1, Ordering::Relaxed);
        let result = self.send(url, body).await;
        if let Err(e) = &result {
            self.requests_failed.fetch_add(1, Ordering::Relaxed);
            warn!("Registry request failed: {}", e);
        }
        result
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        url: Url,
        body: &T,
    ) -> Result<RegistryReply, TransportError> {
        debug!("POST {}", url);

        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body);
        let response = self.apply_auth(request).send().await?;

        let status = response.status();
        debug!("Registry responded with status {}", status);
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let body: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| TransportError::InvalidResponse {
                reason: format!("expected a JSON object: {}", e),
            })?;
        RegistryReply::from_body(body).map_err(|reason| TransportError::InvalidResponse { reason })
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, TransportError> {
    HeaderValue::from_str(value).map_err(|e| TransportError::InvalidConfig {
        reason: format!("invalid value for header '{}': {}", name, e),
    })
}

#[async_trait]
impl ToolBackend for HttpBackend {
    async fn test_tool(
        &self,
        tool_id: &ToolId,
        params: &TestParameters,
    ) -> Result<RegistryReply, TransportError> {
        let url = self.tool_test_url(tool_id, &[])?;
        self.post_json(url, params).await
    }

    async fn save_test_record(
        &self,
        tool_id: &ToolId,
        request: &SaveRecordRequest,
    ) -> Result<RegistryReply, TransportError> {
        let url = self.tool_test_url(tool_id, &["save"])?;
        self.post_json(url, request).await
    }

    fn info(&self) -> BackendInfo {
        let mut info = BackendInfo::new("http", self.config.base_url.as_str());
        info.has_session = self.config.session_id.is_some();
        info.requests_sent = self.requests_sent.load(Ordering::Relaxed);
        info.requests_failed = self.requests_failed.load(Ordering::Relaxed);
        info
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("base_url", &self.config.base_url.as_str())
            .field("has_session", &self.config.session_id.is_some())
            .finish()
    }
}
