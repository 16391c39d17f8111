//! Message and value types exchanged with the tool registry.
//!
//! This module provides:
//! - Identity and parameter types for a test session
//! - Wire envelopes for the test and save endpoints ([`tools`])
//! - Normalized results of a test or save call ([`outcome`])

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod outcome;
pub mod tools;

pub use outcome::{OutcomeStatus, SaveResult, TestOutcome};
pub use tools::{RegistryReply, SaveRecordRequest};

/// Operator-supplied test parameters: an arbitrary JSON tree.
pub type TestParameters = serde_json::Value;

/// Opaque identifier of a registered tool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolId(String);

impl ToolId {
    /// Create a tool identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ToolId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ToolId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ToolId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_id_conversions() {
        assert_eq!(ToolId::from(42u64), ToolId::new("42"));
        assert_eq!(ToolId::from("abc").as_str(), "abc");
        assert_eq!(ToolId::from(String::from("7")).to_string(), "7");
    }

    #[test]
    fn test_tool_id_is_transparent_in_json() {
        let id = ToolId::new("42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
    }
}
