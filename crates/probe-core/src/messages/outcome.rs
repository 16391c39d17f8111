//! Normalized results of test and save calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a single test invocation ended.
///
/// Transport-level failures carry no payload, so a successful detail payload
/// and an HTTP status / transport error can never coexist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Registry reported success
    Succeeded {
        /// Detail payload (`data` field), if any
        detail: Option<Value>,
    },
    /// 2xx reply with an application-level failure flag
    Rejected {
        /// Detail payload sent alongside the failure, if any
        detail: Option<Value>,
    },
    /// Non-2xx reply
    HttpError {
        /// HTTP status code
        status: u16,
    },
    /// Network failure, timeout or undecodable body
    TransportError {
        /// Transport diagnostic
        reason: String,
    },
}

/// Result of one test invocation.
///
/// Created once per call and replaced by the next one; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOutcome {
    /// Operator-facing message
    pub message: Option<String>,
    /// Classified result
    pub status: OutcomeStatus,
}

impl TestOutcome {
    /// Successful invocation.
    pub fn succeeded(message: Option<String>, detail: Option<Value>) -> Self {
        Self {
            message,
            status: OutcomeStatus::Succeeded { detail },
        }
    }

    /// Application-level failure reported in a 2xx body.
    pub fn rejected(message: Option<String>, detail: Option<Value>) -> Self {
        Self {
            message,
            status: OutcomeStatus::Rejected { detail },
        }
    }

    /// Non-2xx HTTP status.
    pub fn http_error(status: u16) -> Self {
        Self {
            message: Some(format!("HTTP error! status: {}", status)),
            status: OutcomeStatus::HttpError { status },
        }
    }

    /// Network-level failure.
    pub fn transport_error(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self {
            message: Some(reason.clone()),
            status: OutcomeStatus::TransportError { reason },
        }
    }

    /// Whether the invocation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Succeeded { .. })
    }

    /// Detail payload, for successes and application rejections.
    pub fn detail(&self) -> Option<&Value> {
        match &self.status {
            OutcomeStatus::Succeeded { detail } | OutcomeStatus::Rejected { detail } => {
                detail.as_ref()
            }
            _ => None,
        }
    }

    /// HTTP status of a non-2xx failure.
    pub fn http_status(&self) -> Option<u16> {
        match self.status {
            OutcomeStatus::HttpError { status } => Some(status),
            _ => None,
        }
    }

    /// Transport diagnostic of a network failure.
    pub fn transport_error_reason(&self) -> Option<&str> {
        match &self.status {
            OutcomeStatus::TransportError { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Result of one record save attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveResult {
    /// Whether the registry stored the record
    pub succeeded: bool,
    /// Operator-facing message
    pub message: Option<String>,
}

impl SaveResult {
    /// Successful save.
    pub fn saved(message: Option<String>) -> Self {
        Self {
            succeeded: true,
            message,
        }
    }

    /// Failed save.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_accessors() {
        let outcome = TestOutcome::succeeded(None, Some(json!({"x": 1})));
        assert!(outcome.is_success());
        assert_eq!(outcome.detail(), Some(&json!({"x": 1})));
        assert_eq!(outcome.http_status(), None);
        assert_eq!(outcome.transport_error_reason(), None);
    }

    #[test]
    fn test_failures_have_no_success_payload() {
        let outcome = TestOutcome::http_error(502);
        assert!(!outcome.is_success());
        assert_eq!(outcome.http_status(), Some(502));
        assert_eq!(outcome.detail(), None);
        assert_eq!(outcome.message.as_deref(), Some("HTTP error! status: 502"));

        let outcome = TestOutcome::transport_error("connection refused");
        assert_eq!(outcome.transport_error_reason(), Some("connection refused"));
        assert_eq!(outcome.detail(), None);
    }

    #[test]
    fn test_rejection_keeps_detail() {
        let outcome = TestOutcome::rejected(Some("bad city".into()), Some(json!({"code": 4})));
        assert!(!outcome.is_success());
        assert_eq!(outcome.detail(), Some(&json!({"code": 4})));
    }

    #[test]
    fn test_status_serialization_tag() {
        let json = serde_json::to_value(TestOutcome::http_error(404)).unwrap();
        assert_eq!(json["status"]["kind"], "http_error");
        assert_eq!(json["status"]["status"], 404);
    }
}
