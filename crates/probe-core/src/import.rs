//! Tool definition import: read, validate and hand off a JSON export.
//!
//! An import file is an export of one tool definition. It must contain an
//! `mcpTool` object with the fields the add-tool wizard needs. Valid
//! documents are parked in a [`HandoffStore`] under an opaque key and the
//! caller is pointed at the wizard with an import marker in the query.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ImportError;

/// Key the imported document is stored under.
pub const HANDOFF_KEY: &str = "importToolData";

/// Default wizard page receiving the import.
pub const DEFAULT_TARGET_URL: &str = "/tool-wizard/unified-add";

/// Fields every imported `mcpTool` must carry.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "toolName",
    "toolDescription",
    "convertType",
    "inputSchema",
    "outputSchema",
];

/// How a tool converts calls into upstream requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConvertType {
    /// `"1"`: plain HTTP
    Http,
    /// `"2"`: Expo
    Expo,
    /// `"3"`: manual
    Manual,
}

impl ConvertType {
    /// Parse the wire code. Only the string codes are accepted.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Self::Http),
            "2" => Some(Self::Expo),
            "3" => Some(Self::Manual),
            _ => None,
        }
    }

    /// Wire code.
    pub fn code(self) -> &'static str {
        match self {
            Self::Http => "1",
            Self::Expo => "2",
            Self::Manual => "3",
        }
    }
}

impl fmt::Display for ConvertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Http => "HTTP",
            Self::Expo => "Expo",
            Self::Manual => "Manual",
        };
        f.write_str(name)
    }
}

/// Summary of a validated import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedTool {
    /// Tool name
    pub tool_name: String,
    /// Conversion type
    pub convert_type: ConvertType,
    /// Whole document, as handed to the wizard
    pub document: Value,
}

/// Read an import file. It must be named `*.json` and contain JSON.
pub fn read_json_file(path: &Path) -> Result<Value, ImportError> {
    if path.as_os_str().is_empty() {
        return Err(ImportError::NoFile);
    }
    let is_json = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".json"));
    if !is_json {
        return Err(ImportError::NotJsonFile {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ImportError::Malformed(e.to_string()))
}

/// Check the structure of an import document.
pub fn validate_import(document: &Value) -> Result<ImportedTool, ImportError> {
    let root = document
        .as_object()
        .ok_or_else(|| ImportError::Invalid("Data format error: expected a JSON object".into()))?;

    let tool = root
        .get("mcpTool")
        .filter(|tool| is_truthy(tool))
        .ok_or_else(|| ImportError::Invalid("Missing MCP tool information (mcpTool)".into()))?;

    for field in REQUIRED_FIELDS {
        if !tool.get(field).is_some_and(is_truthy) {
            return Err(ImportError::Invalid(format!(
                "MCP tool is missing required field: {}",
                field
            )));
        }
    }

    let convert_type = tool
        .get("convertType")
        .and_then(Value::as_str)
        .and_then(ConvertType::from_code)
        .ok_or_else(|| {
            ImportError::Invalid(format!(
                "Invalid convertType: {}, must be '1' (HTTP), '2' (Expo) or '3' (Manual)",
                tool.get("convertType").map(display_value).unwrap_or_default()
            ))
        })?;

    for field in ["inputSchema", "outputSchema"] {
        let valid = tool
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|schema| serde_json::from_str::<Value>(schema).is_ok());
        if !valid {
            return Err(ImportError::Invalid(
                "inputSchema or outputSchema is not valid JSON".into(),
            ));
        }
    }

    let tool_name = tool
        .get("toolName")
        .map(display_value)
        .unwrap_or_default();

    debug!("Import document for tool '{}' is valid", tool_name);
    Ok(ImportedTool {
        tool_name,
        convert_type,
        document: document.clone(),
    })
}

/// JavaScript-style truthiness, which is what the wizard checks.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Transient key/value store handing imported documents to the wizard.
///
/// One file per key inside a private directory.
#[derive(Debug, Clone)]
pub struct HandoffStore {
    dir: PathBuf,
}

impl HandoffStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Store `document` under `key`, replacing any previous value.
    pub fn store(&self, key: &str, document: &Value) -> Result<PathBuf, ImportError> {
        fs::create_dir_all(&self.dir).map_err(|e| ImportError::Store(e.to_string()))?;
        let path = self.path_for(key);
        let content =
            serde_json::to_string(document).map_err(|e| ImportError::Store(e.to_string()))?;
        fs::write(&path, content).map_err(|e| ImportError::Store(e.to_string()))?;
        Ok(path)
    }

    /// Fetch the value under `key`. Missing or unreadable entries yield `None`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let content = fs::read_to_string(self.path_for(key)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Remove the value under `key`, if any.
    pub fn clear(&self, key: &str) {
        let _ = fs::remove_file(self.path_for(key));
    }
}

/// Outcome of a completed import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportHandoff {
    /// Validated tool summary
    pub tool: ImportedTool,
    /// Where the wizard should be opened
    pub redirect: String,
}

/// Read → validate → store → compute redirect.
pub fn handle_import(
    path: &Path,
    store: &HandoffStore,
    target_url: &str,
) -> Result<ImportHandoff, ImportError> {
    let document = read_json_file(path)?;
    let tool = validate_import(&document)?;
    store.store(HANDOFF_KEY, &document)?;

    let redirect = format!("{}?mode=import", target_url);
    info!(
        "Imported tool '{}' ({}) from {}",
        tool.tool_name,
        tool.convert_type,
        path.display()
    );
    Ok(ImportHandoff { tool, redirect })
}
