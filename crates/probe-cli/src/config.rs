//! Configuration management for Tool Probe CLI
//!
//! Settings come from a TOML file and can be overridden by command-line
//! flags or their environment variables.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tool_probe_core::import::DEFAULT_TARGET_URL;
use tool_probe_core::transport::{AuthConfig, BackendConfig};
use url::Url;

use crate::cli::Cli;

/// CLI configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Registry backend
    pub backend: BackendSettings,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Import hand-off
    pub import: ImportConfig,
}

/// Registry backend settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendSettings {
    /// Registry base URL
    pub base_url: Option<Url>,

    /// Request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Session id forwarded to the registry
    pub session_id: Option<String>,

    /// Bearer token
    pub auth_token: Option<String>,

    /// Extra headers sent with every request
    pub headers: HashMap<String, String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `info` or `tool_probe_core=debug`
    pub level: Option<String>,

    /// Log file path (default: timestamped file under the logs directory)
    pub file: Option<PathBuf>,
}

/// Import configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImportConfig {
    /// Wizard page that receives imported definitions
    pub target_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            session_id: None,
            auth_token: None,
            headers: HashMap::new(),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file; a missing file yields the defaults
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration {}", path.display()))?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Apply command-line overrides (flags take precedence over the file)
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(base_url) = &cli.base_url {
            self.backend.base_url = Some(base_url.clone());
        }
        if let Some(session_id) = &cli.session_id {
            self.backend.session_id = Some(session_id.clone());
        }
        self
    }

    /// Build the backend configuration for the core library
    pub fn to_backend_config(&self) -> Result<BackendConfig> {
        let Some(base_url) = &self.backend.base_url else {
            bail!("No registry base URL configured; pass --base-url or set backend.base_url");
        };

        let mut config =
            BackendConfig::new(base_url.as_str())?.with_timeout(self.backend.timeout);
        if let Some(session_id) = &self.backend.session_id {
            config = config.with_session_id(session_id.clone());
        }
        if let Some(token) = &self.backend.auth_token {
            config = config.with_auth(AuthConfig::bearer(token.clone()));
        }
        for (name, value) in &self.backend.headers {
            config = config.with_header(name.clone(), value.clone());
        }
        Ok(config)
    }

    /// Check the configuration for problems that would fail at request time
    pub fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.backend.base_url {
            if !matches!(base_url.scheme(), "http" | "https") {
                bail!("backend.base_url must use http or https, got {}", base_url.scheme());
            }
        }
        if self.backend.timeout.is_zero() {
            bail!("backend.timeout must be greater than zero");
        }
        if self.import.target_url.trim().is_empty() {
            bail!("import.target_url must not be empty");
        }
        if let Some(level) = &self.logging.level {
            tracing_subscriber::EnvFilter::try_new(level)
                .with_context(|| format!("Invalid logging.level '{}'", level))?;
        }
        Ok(())
    }
}
