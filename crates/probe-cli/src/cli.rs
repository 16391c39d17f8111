//! Command-line interface definitions for Tool Probe

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use url::Url;

/// Tool Probe - test tool definitions and record verified results
#[derive(Parser, Debug)]
#[command(
    name = "tool-probe",
    version,
    about = "Test tool definitions against a tool registry and save verified results",
    long_about = "Tool Probe runs a registered tool's test endpoint with the parameters you provide, shows the outcome and saves the verified parameter/result pair back to the registry once you confirm it."
)]
pub struct Cli {
    /// Enable verbose logging (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file to load
    #[arg(short, long, global = true, env = "TOOL_PROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Registry base URL (overrides the configuration file)
    #[arg(long, global = true, env = "TOOL_PROBE_BASE_URL")]
    pub base_url: Option<Url>,

    /// Registry session id sent with every request
    #[arg(long, global = true, env = "TOOL_PROBE_SESSION_ID")]
    pub session_id: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test a tool and optionally save the verified result
    Test(TestArgs),

    /// Import a tool definition exported as JSON
    Import(ImportArgs),

    /// Manage configuration files
    Config(ConfigArgs),
}

/// Arguments for the test command
#[derive(Args, Debug)]
pub struct TestArgs {
    /// Tool id in the registry
    #[arg(short, long)]
    pub tool: String,

    /// Test parameters as a JSON object (empty means `{}`)
    #[arg(short, long, conflicts_with = "params_file")]
    pub params: Option<String>,

    /// Read test parameters from a file
    #[arg(long, value_name = "PATH")]
    pub params_file: Option<PathBuf>,

    /// Save the result without asking when the test succeeds
    #[arg(long)]
    pub save: bool,

    /// Answer yes to every confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Edit, run and save in a loop until you quit
    #[arg(short, long, conflicts_with_all = ["save", "yes"])]
    pub interactive: bool,

    /// Output format for the test result
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the import command
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Exported tool definition (*.json)
    pub file: PathBuf,

    /// Wizard page that receives the import
    #[arg(long)]
    pub target_url: Option<String>,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Generate a new configuration file
    Init {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Validate an existing configuration file
    Validate {
        /// Configuration file to validate
        config: Option<PathBuf>,
    },

    /// Show the effective configuration (file plus command-line overrides)
    Show,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// HTML fragment
    Html,
    /// JSON presentation
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_test_command() {
        let cli = Cli::try_parse_from([
            "tool-probe",
            "--base-url",
            "http://localhost:8080",
            "test",
            "--tool",
            "42",
            "--params",
            "{\"city\":\"Paris\"}",
            "--save",
            "--format",
            "html",
        ])
        .unwrap();

        assert_eq!(cli.base_url.unwrap().as_str(), "http://localhost:8080/");
        match cli.command {
            Commands::Test(args) => {
                assert_eq!(args.tool, "42");
                assert!(args.save);
                assert_eq!(args.format, OutputFormat::Html);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_params_sources_conflict() {
        let result = Cli::try_parse_from([
            "tool-probe",
            "test",
            "--tool",
            "1",
            "--params",
            "{}",
            "--params-file",
            "p.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_interactive_conflicts_with_save() {
        let result =
            Cli::try_parse_from(["tool-probe", "test", "--tool", "1", "--interactive", "--save"]);
        assert!(result.is_err());
    }
}
