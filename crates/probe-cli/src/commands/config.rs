//! Configuration management command implementation

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::Config;
use crate::utils::print_success;

/// Execute the config command
///
/// `effective` is the configuration loaded from `config_path` with the
/// command-line overrides applied.
pub fn run(args: ConfigArgs, effective: &Config, config_path: &Path) -> Result<()> {
    let resolve = |path: Option<PathBuf>| path.unwrap_or_else(|| config_path.to_path_buf());

    match args.action {
        ConfigAction::Init { output, force } => init_config(&resolve(output), force),
        ConfigAction::Validate { config } => validate_config(&resolve(config)),
        ConfigAction::Show => show_config(effective, config_path),
    }
}

/// Write the configuration template
fn init_config(config_path: &Path, force: bool) -> Result<()> {
    println!(
        "🔧 Initializing configuration file: {}",
        config_path.display()
    );

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists: {} (use --force to overwrite)",
            config_path.display()
        );
    }
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(config_path, generate_config_template())?;
    print_success("Configuration file created successfully");
    Ok(())
}

/// Parse and check an existing configuration file
fn validate_config(config_path: &Path) -> Result<()> {
    println!("🔍 Validating configuration: {}", config_path.display());

    if !config_path.exists() {
        bail!("Configuration file not found: {}", config_path.display());
    }

    let config = Config::load_from_file(config_path)?;
    config.validate()?;

    if config.backend.base_url.is_none() {
        println!("⚠️  backend.base_url is not set; pass --base-url when testing");
    }
    print_success("Configuration is valid");
    Ok(())
}

/// Print the effective configuration, defaults and overrides included
fn show_config(effective: &Config, config_path: &Path) -> Result<()> {
    println!("📄 Configuration: {}", config_path.display());

    if !config_path.exists() {
        println!("   (file not found, showing defaults)");
    }

    println!("\n{}", render_config(effective)?);
    Ok(())
}

fn render_config(config: &Config) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

fn generate_config_template() -> String {
    r#"# Tool Probe Configuration

[backend]
base_url = "http://localhost:8080"
timeout = "30s"
# session_id = "registry-session-id"
# auth_token = "token"

[backend.headers]
# "X-Tenant" = "acme"

[logging]
# level = "tool_probe=debug,tool_probe_core=debug,info"
# file = "/tmp/tool-probe.log"

[import]
target_url = "/tool-wizard/unified-add"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_template_is_valid_config() -> Result<()> {
        let config: Config = toml::from_str(&generate_config_template())?;
        config.validate()?;
        assert_eq!(
            config.backend.base_url.map(|url| url.to_string()),
            Some("http://localhost:8080/".to_string())
        );
        assert_eq!(config.backend.timeout, Duration::from_secs(30));
        Ok(())
    }

    #[test]
    fn test_init_refuses_to_overwrite() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("nested").join("config.toml");

        init_config(&path, false)?;
        assert!(path.exists());
        assert!(init_config(&path, false).is_err());
        init_config(&path, true)?;

        validate_config(&path)?;
        Ok(())
    }

    #[test]
    fn test_show_reflects_overrides() -> Result<()> {
        use clap::Parser;

        let temp = TempDir::new()?;
        let path = temp.path().join("config.toml");
        init_config(&path, false)?;

        let cli = crate::cli::Cli::try_parse_from([
            "tool-probe",
            "--base-url",
            "http://override.local:9000",
            "config",
            "show",
        ])?;
        let effective = Config::load_from_file(&path)?.with_overrides(&cli);

        let shown = render_config(&effective)?;
        assert!(shown.contains("http://override.local:9000/"));
        assert!(!shown.contains("localhost:8080"));
        show_config(&effective, &path)?;
        Ok(())
    }

    #[test]
    fn test_init_force_replaces_corrupt_file() -> Result<()> {
        let temp = TempDir::new()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[backend\nbroken")?;
        assert!(Config::load_from_file(&path).is_err());

        init_config(&path, true)?;
        validate_config(&path)?;
        Ok(())
    }

    #[test]
    fn test_validate_missing_file() {
        assert!(validate_config(Path::new("/nonexistent/config.toml")).is_err());
    }
}
