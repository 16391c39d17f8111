//! Import command: validate an exported tool definition and hand it to the wizard

use anyhow::Result;
use tool_probe_core::import::{handle_import, HandoffStore};

use crate::cli::ImportArgs;
use crate::config::Config;
use crate::paths::ToolProbePaths;
use crate::utils::{print_info, print_success};

/// Execute the import command
pub fn run(args: ImportArgs, config: &Config, paths: &ToolProbePaths) -> Result<()> {
    let store = HandoffStore::new(&paths.handoff_dir);
    let target_url = args
        .target_url
        .as_deref()
        .unwrap_or(config.import.target_url.as_str());

    println!("📥 Importing tool definition: {}", args.file.display());
    let handoff = handle_import(&args.file, &store, target_url)?;

    print_success(&format!(
        "Tool '{}' ({}) is valid and ready to import",
        handoff.tool.tool_name, handoff.tool.convert_type
    ));
    print_info(&format!("Continue in the wizard: {}", handoff.redirect));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tool_probe_core::import::HANDOFF_KEY;

    #[test]
    fn test_import_uses_configured_target_and_store() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = ToolProbePaths::with_home(temp.path().join("home"))?;
        let file = temp.path().join("tool.json");
        let document = json!({
            "mcpTool": {
                "toolName": "echo",
                "toolDescription": "Echo the input",
                "convertType": "3",
                "inputSchema": "{}",
                "outputSchema": "{}"
            }
        });
        std::fs::write(&file, document.to_string())?;

        let args = ImportArgs {
            file,
            target_url: Some("/wizard".to_string()),
        };
        run(args, &Config::default(), &paths)?;

        assert_eq!(
            HandoffStore::new(&paths.handoff_dir).get(HANDOFF_KEY),
            Some(document)
        );
        Ok(())
    }

    #[test]
    fn test_import_rejects_non_json_name() -> Result<()> {
        let temp = TempDir::new()?;
        let paths = ToolProbePaths::with_home(temp.path().to_path_buf())?;
        let args = ImportArgs {
            file: PathBuf::from("tool.yaml"),
            target_url: None,
        };

        let err = run(args, &Config::default(), &paths).unwrap_err();
        assert!(err.to_string().contains("tool.yaml"));
        Ok(())
    }
}
