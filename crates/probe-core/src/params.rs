//! Parameter Editor: turns operator text into test parameters.

use serde_json::{Map, Value};

use crate::error::ParseError;
use crate::messages::TestParameters;

/// Parse raw operator input into structured test parameters.
///
/// Blank input stands for a zero-argument call and yields `{}`. Anything
/// else must be a syntactically valid JSON document; its shape is not
/// checked here because the registry owns schema validation.
pub fn parse(raw: &str) -> Result<TestParameters, ParseError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_str(raw).map_err(ParseError::from)
}
