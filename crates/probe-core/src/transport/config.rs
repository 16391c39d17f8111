//! Backend configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::error::TransportError;

/// Connection settings for the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Registry root, e.g. `http://localhost:8080`
    pub base_url: Url,

    /// Whole-request timeout, surfaced as a transport failure
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,

    /// Registry session id sent as `X-Session-Id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Optional authentication
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,

    /// Extra static headers
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

impl BackendConfig {
    /// Create a configuration for the given registry URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url.as_ref()).map_err(|e| TransportError::InvalidConfig {
            reason: format!("invalid base URL '{}': {}", base_url.as_ref(), e),
        })?;

        if base_url.cannot_be_a_base() {
            return Err(TransportError::InvalidConfig {
                reason: format!("'{}' cannot be used as a base URL", base_url),
            });
        }

        Ok(Self {
            base_url,
            timeout: default_timeout(),
            session_id: None,
            auth: None,
            headers: HashMap::new(),
        })
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a registry session id.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set authentication.
    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Add a static header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Authentication schemes supported by the registry gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthConfig {
    /// `Authorization: Bearer <token>`
    Bearer {
        /// Bearer token
        token: String,
    },
    /// HTTP basic authentication
    Basic {
        /// User name
        username: String,
        /// Password
        password: Option<String>,
    },
}

impl AuthConfig {
    /// Bearer token authentication.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = BackendConfig::new("http://localhost:8080")
            .unwrap()
            .with_timeout(Duration::from_secs(5))
            .with_session_id("abc")
            .with_auth(AuthConfig::bearer("t0k"))
            .with_header("X-Tenant", "ops");

        assert_eq!(config.base_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.session_id.as_deref(), Some("abc"));
        assert_eq!(config.headers.get("X-Tenant").map(String::as_str), Some("ops"));
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(BackendConfig::new("not a url").is_err());
        assert!(BackendConfig::new("mailto:ops@example.com").is_err());
    }

    #[test]
    fn test_humantime_timeout_roundtrip() {
        let json = serde_json::json!({
            "base_url": "https://registry.example.com/",
            "timeout": "45s",
            "auth": {"type": "bearer", "token": "t"}
        });

        let config: BackendConfig = serde_json::from_value(json).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(45));
        assert_eq!(config.auth, Some(AuthConfig::bearer("t")));

        let without_timeout: BackendConfig =
            serde_json::from_value(serde_json::json!({"base_url": "http://h/"})).unwrap();
        assert_eq!(without_timeout.timeout, Duration::from_secs(30));
    }
}
