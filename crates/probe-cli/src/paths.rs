//! Path management for Tool Probe file system organization
//!
//! Everything lives under `~/.tool-probe`: logs, configuration and the
//! import hand-off store.

use anyhow::Result;
use std::path::PathBuf;

/// Central path manager for Tool Probe files
#[derive(Debug, Clone)]
pub struct ToolProbePaths {
    /// Tool Probe home directory (e.g., ~/.tool-probe)
    pub home_dir: PathBuf,
    /// Logs directory for all log files
    pub logs_dir: PathBuf,
    /// Config directory for configuration files
    pub config_dir: PathBuf,
    /// Hand-off directory for imported tool definitions
    pub handoff_dir: PathBuf,
}

impl ToolProbePaths {
    /// Create a path manager under the user's home and ensure the directories exist
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_home(home.join(".tool-probe"))
    }

    /// Create a path manager rooted at `home_dir`
    pub fn with_home(home_dir: PathBuf) -> Result<Self> {
        let paths = Self {
            logs_dir: home_dir.join("logs"),
            config_dir: home_dir.join("config"),
            handoff_dir: home_dir.join("handoff"),
            home_dir,
        };
        paths.ensure_directories_exist()?;
        Ok(paths)
    }

    fn ensure_directories_exist(&self) -> Result<()> {
        for dir in [&self.home_dir, &self.logs_dir, &self.config_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Get a log file path with timestamp
    pub fn log_file(&self, name: &str) -> PathBuf {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        self.logs_dir.join(format!("{}-{}.log", name, timestamp))
    }

    /// Get the default config file path
    pub fn default_config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_creation() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = ToolProbePaths::with_home(temp.path().join(".tool-probe"))?;

        assert!(paths.home_dir.exists());
        assert!(paths.logs_dir.exists());
        assert!(paths.config_dir.exists());
        // Created lazily by the hand-off store.
        assert!(!paths.handoff_dir.exists());
        Ok(())
    }

    #[test]
    fn test_path_generation() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = ToolProbePaths::with_home(temp.path().to_path_buf())?;

        let log_path = paths.log_file("tool-probe");
        assert!(log_path.starts_with(&paths.logs_dir));
        assert!(log_path.to_string_lossy().contains("tool-probe-"));
        assert_eq!(log_path.extension().unwrap(), "log");

        assert_eq!(
            paths.default_config_file(),
            paths.config_dir.join("config.toml")
        );
        Ok(())
    }
}
