//! Error types for the tool probe core.
//!
//! Errors are split the same way the workflow is: operator input errors,
//! transport errors raised at the network boundary, and guard errors raised
//! by the session state machine. Transport errors never leave the invoker or
//! saver unformatted; they are folded into a [`crate::TestOutcome`] or
//! [`crate::SaveResult`] there.

use thiserror::Error;

/// Result alias used across the crate.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Top-level error for workflow entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    /// Parameter text was not valid JSON. Never reaches the network.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A test was requested before any tool was selected.
    #[error("No tool selected: begin a test session before running a test")]
    NoActiveTool,

    /// Save was requested while no verified record exists or a save is
    /// already in flight or complete.
    #[error("Cannot save test record: {reason}")]
    SaveConflict {
        /// Why the request was rejected
        reason: String,
    },

    /// Backend could not be constructed or addressed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ProbeError {
    /// Create a save conflict error.
    pub fn save_conflict(reason: impl Into<String>) -> Self {
        Self::SaveConflict {
            reason: reason.into(),
        }
    }
}

/// Malformed parameter document.
///
/// `message` is the JSON parser's own diagnostic, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Parameter JSON is malformed: {message}")]
pub struct ParseError {
    /// Parser diagnostic
    pub message: String,
    /// 1-based line of the failure, 0 when unknown
    pub line: usize,
    /// 1-based column of the failure, 0 when unknown
    pub column: usize,
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// Errors raised while talking to the registry over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection could not be established or the request failed mid-flight.
    #[error("Network error: {reason}")]
    Network {
        /// Underlying client diagnostic
        reason: String,
    },

    /// Request exceeded the configured client timeout.
    #[error("Request timed out: {reason}")]
    Timeout {
        /// Underlying client diagnostic
        reason: String,
    },

    /// Registry answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
    },

    /// 2xx response whose body is not the expected JSON envelope.
    #[error("Invalid response from registry: {reason}")]
    InvalidResponse {
        /// Decoder diagnostic
        reason: String,
    },

    /// Backend configuration is unusable.
    #[error("Invalid backend configuration: {reason}")]
    InvalidConfig {
        /// What is wrong
        reason: String,
    },
}

impl TransportError {
    /// HTTP status carried by this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                reason: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            Self::HttpStatus {
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            Self::InvalidResponse {
                reason: err.to_string(),
            }
        } else {
            Self::Network {
                reason: err.to_string(),
            }
        }
    }
}

/// Failures of the tool import collaborator.
#[derive(Debug, Error)]
pub enum ImportError {
    /// No file was given.
    #[error("No file selected")]
    NoFile,

    /// File name does not end in `.json`.
    #[error("Please select a JSON file: {path}")]
    NotJsonFile {
        /// Offending path
        path: String,
    },

    /// File could not be read.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// File content is not JSON.
    #[error("JSON file is malformed: {0}")]
    Malformed(String),

    /// Document parsed but failed structural validation.
    #[error("{0}")]
    Invalid(String),

    /// Hand-off store could not persist the document.
    #[error("Unable to store import data: {0}")]
    Store(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_keeps_parser_message() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let expected = err.to_string();
        let parse: ParseError = err.into();

        assert_eq!(parse.message, expected);
        assert_eq!(parse.line, 1);
        assert!(parse.to_string().contains(&expected));
    }

    #[test]
    fn test_http_status_message() {
        let err = TransportError::HttpStatus { status: 503 };
        assert_eq!(err.to_string(), "HTTP error! status: 503");
        assert_eq!(err.http_status(), Some(503));
        assert_eq!(
            TransportError::Network {
                reason: "refused".into()
            }
            .http_status(),
            None
        );
    }

    #[test]
    fn test_save_conflict_display() {
        let err = ProbeError::save_conflict("already saved");
        assert_eq!(err.to_string(), "Cannot save test record: already saved");
    }
}
