//! Result Renderer: outcome and session state to presentation.
//!
//! Rendering is pure. Equal inputs always give equal presentations, which is
//! what lets the CLI re-render freely and lets tests compare snapshots.
//!
//! The save affordance is part of every presentation so the layout does not
//! shift between states; it is only enabled when a save can be accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::messages::TestOutcome;
use crate::session::{SaveState, SessionSnapshot};

/// Label of the save affordance before any attempt.
pub const CONFIRM_SAVE_LABEL: &str = "Confirm & save";

/// Visual tone of a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// No test has run yet
    Idle,
    /// A test is running
    Busy,
    /// Test succeeded
    Success,
    /// Test failed
    Failure,
}

/// Headline of a presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    /// Tone
    pub tone: Tone,
    /// Short title
    pub title: String,
    /// Supporting message
    pub message: Option<String>,
}

/// The "confirm & save" control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAffordance {
    /// Button label
    pub label: String,
    /// Whether activating it is allowed
    pub enabled: bool,
    /// Explanation shown under the control
    pub caption: Option<String>,
    /// Whether the record is saved for good
    pub terminal: bool,
}

impl SaveAffordance {
    fn enabled(label: &str, caption: Option<String>) -> Self {
        Self {
            label: label.to_string(),
            enabled: true,
            caption,
            terminal: false,
        }
    }

    fn disabled(label: &str, caption: Option<String>) -> Self {
        Self {
            label: label.to_string(),
            enabled: false,
            caption,
            terminal: false,
        }
    }
}

/// Everything needed to draw the test result panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    /// Headline
    pub banner: Banner,
    /// Pretty-printed detail payload
    pub detail: Option<String>,
    /// Save control
    pub save_action: SaveAffordance,
}

/// Render a single test outcome.
pub fn render(outcome: &TestOutcome) -> Presentation {
    let detail = outcome.detail().map(pretty_json);

    if outcome.is_success() {
        Presentation {
            banner: Banner {
                tone: Tone::Success,
                title: "Test succeeded".to_string(),
                message: Some(
                    outcome
                        .message
                        .clone()
                        .unwrap_or_else(|| crate::invoker::DEFAULT_SUCCESS_MESSAGE.to_string()),
                ),
            },
            detail,
            save_action: SaveAffordance::enabled(CONFIRM_SAVE_LABEL, None),
        }
    } else {
        Presentation {
            banner: Banner {
                tone: Tone::Failure,
                title: "Test failed".to_string(),
                message: Some(
                    outcome
                        .message
                        .clone()
                        .unwrap_or_else(|| crate::invoker::DEFAULT_FAILURE_MESSAGE.to_string()),
                ),
            },
            detail,
            save_action: SaveAffordance::disabled(
                CONFIRM_SAVE_LABEL,
                Some("Only a successful test result can be saved".to_string()),
            ),
        }
    }
}

/// Render the whole session: pending and idle states plus save progress.
pub fn render_session(snapshot: &SessionSnapshot) -> Presentation {
    if snapshot.pending {
        return Presentation {
            banner: Banner {
                tone: Tone::Busy,
                title: "Testing…".to_string(),
                message: Some("Running the test, please wait…".to_string()),
            },
            detail: None,
            save_action: SaveAffordance::disabled(
                CONFIRM_SAVE_LABEL,
                Some("Wait for the test to finish".to_string()),
            ),
        };
    }

    let Some(outcome) = &snapshot.outcome else {
        return Presentation {
            banner: Banner {
                tone: Tone::Idle,
                title: "Waiting for test…".to_string(),
                message: None,
            },
            detail: None,
            save_action: SaveAffordance::disabled(
                CONFIRM_SAVE_LABEL,
                Some("Run a test first".to_string()),
            ),
        };
    };

    let mut presentation = render(outcome);
    if snapshot.verified.is_none() {
        return presentation;
    }

    presentation.save_action = match snapshot.save_state {
        SaveState::NotAttempted => presentation.save_action,
        SaveState::InFlight => SaveAffordance::disabled("Saving…", None),
        SaveState::Saved => SaveAffordance {
            label: "Saved".to_string(),
            enabled: false,
            caption: Some(
                snapshot
                    .save_message
                    .clone()
                    .unwrap_or_else(|| "Test record saved".to_string()),
            ),
            terminal: true,
        },
        SaveState::Failed => SaveAffordance::enabled(
            "Retry save",
            Some(
                snapshot
                    .save_message
                    .clone()
                    .unwrap_or_else(|| crate::saver::DEFAULT_SAVE_FAILURE_MESSAGE.to_string()),
            ),
        ),
    };
    presentation
}

fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

impl Presentation {
    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let icon = match self.banner.tone {
            Tone::Idle => "ℹ️ ",
            Tone::Busy => "⏳",
            Tone::Success => "✅",
            Tone::Failure => "❌",
        };

        let mut out = format!("{} {}\n", icon, self.banner.title);
        if let Some(message) = &self.banner.message {
            out.push_str(&format!("   {}\n", message));
        }
        if let Some(detail) = &self.detail {
            out.push_str("\nDetailed result:\n");
            out.push_str(detail);
            out.push('\n');
        }

        let state = if self.save_action.terminal {
            "done"
        } else if self.save_action.enabled {
            "available"
        } else {
            "disabled"
        };
        out.push_str(&format!("\n[{}] ({})", self.save_action.label, state));
        if let Some(caption) = &self.save_action.caption {
            out.push_str(&format!(" {}", caption));
        }
        out.push('\n');
        out
    }

    /// HTML fragment in the console's alert markup. All text is escaped.
    pub fn to_html(&self) -> String {
        use html_escape::encode_text;

        let (class, icon) = match self.banner.tone {
            Tone::Idle => ("alert-secondary", "fa-info-circle"),
            Tone::Busy => ("alert-info", "fa-spinner fa-spin"),
            Tone::Success => ("alert-success", "fa-check-circle"),
            Tone::Failure => ("alert-danger", "fa-times-circle"),
        };

        let mut html = format!(
            "<div class=\"alert {} mb-0\">\n  <h6 class=\"alert-heading\"><i class=\"fas {} me-2\"></i>{}</h6>\n",
            class,
            icon,
            encode_text(&self.banner.title)
        );
        if let Some(message) = &self.banner.message {
            html.push_str(&format!("  <p class=\"mb-0\">{}</p>\n", encode_text(message)));
        }
        html.push_str("</div>\n");

        if let Some(detail) = &self.detail {
            html.push_str(&format!(
                "<div class=\"mt-3\">\n  <h6><i class=\"fas fa-file-code me-1\"></i>Detailed result:</h6>\n  <pre class=\"bg-white border rounded p-2 mb-0\"><code>{}</code></pre>\n</div>\n",
                encode_text(detail)
            ));
        }

        html.push_str(&format!(
            "<button type=\"button\" class=\"btn btn-primary\"{}>{}</button>\n",
            if self.save_action.enabled { "" } else { " disabled" },
            encode_text(&self.save_action.label)
        ));
        if let Some(caption) = &self.save_action.caption {
            html.push_str(&format!(
                "<small class=\"text-muted\">{}</small>\n",
                encode_text(caption)
            ));
        }
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::TestParameters;
    use crate::session::SessionState;
    use serde_json::json;

    fn verified_session() -> SessionState {
        let mut session = SessionState::new();
        session.begin_test("7");
        let params: TestParameters = json!({});
        let ticket = session.start_invocation(&params).unwrap();
        session.on_outcome(
            &ticket,
            TestOutcome::succeeded(None, Some(json!({"x": 1}))),
            params,
        );
        session
    }

    #[test]
    fn test_success_presentation() {
        let outcome = TestOutcome::succeeded(None, Some(json!({"x": 1})));
        let presentation = render(&outcome);

        assert_eq!(presentation.banner.tone, Tone::Success);
        assert_eq!(presentation.detail.as_deref(), Some("{\n  \"x\": 1\n}"));
        assert!(presentation.save_action.enabled);
        assert_eq!(presentation.save_action.label, CONFIRM_SAVE_LABEL);
    }

    #[test]
    fn test_failure_presentation_keeps_disabled_affordance() {
        let outcome = TestOutcome::rejected(Some("city unknown".into()), None);
        let presentation = render(&outcome);

        assert_eq!(presentation.banner.tone, Tone::Failure);
        assert_eq!(presentation.banner.message.as_deref(), Some("city unknown"));
        assert!(!presentation.save_action.enabled);
        assert!(presentation.save_action.caption.is_some());
        assert_eq!(presentation.detail, None);
    }

    #[test]
    fn test_render_is_pure() {
        let outcomes = [
            TestOutcome::succeeded(Some("ok".into()), Some(json!({"a": [1, 2, {"b": null}]}))),
            TestOutcome::rejected(None, Some(json!("partial"))),
            TestOutcome::http_error(500),
            TestOutcome::transport_error("refused"),
        ];

        for outcome in &outcomes {
            let copy = outcome.clone();
            assert_eq!(render(outcome), render(&copy));
            assert_eq!(render(outcome).to_html(), render(&copy).to_html());
        }
    }

    #[test]
    fn test_session_states() {
        let mut session = SessionState::new();
        assert_eq!(render_session(&session.snapshot()).banner.tone, Tone::Idle);

        session.begin_test("7");
        let _ = session.start_invocation(&json!({})).unwrap();
        let busy = render_session(&session.snapshot());
        assert_eq!(busy.banner.tone, Tone::Busy);
        assert!(!busy.save_action.enabled);
    }

    #[test]
    fn test_save_state_overlay() {
        let mut session = verified_session();
        assert!(render_session(&session.snapshot()).save_action.enabled);

        let ticket = session.confirm_save_requested().unwrap();
        let saving = render_session(&session.snapshot()).save_action;
        assert!(!saving.enabled);
        assert_eq!(saving.label, "Saving…");

        session.on_save_outcome(&ticket, &crate::SaveResult::failed("duplicate"));
        let failed = render_session(&session.snapshot()).save_action;
        assert!(failed.enabled);
        assert_eq!(failed.caption.as_deref(), Some("duplicate"));

        let ticket = session.confirm_save_requested().unwrap();
        session.on_save_outcome(&ticket, &crate::SaveResult::saved(None));
        let saved = render_session(&session.snapshot()).save_action;
        assert!(!saved.enabled);
        assert!(saved.terminal);
        assert_eq!(saved.label, "Saved");
    }

    #[test]
    fn test_html_is_escaped() {
        let outcome = TestOutcome::rejected(Some("<script>alert(1)</script>".into()), None);
        let html = render(&outcome).to_html();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("alert-danger"));
        assert!(html.contains(" disabled>"));
    }

    #[test]
    fn test_text_output() {
        let outcome = TestOutcome::succeeded(Some("fine".into()), Some(json!({"x": 1})));
        let text = render(&outcome).to_text();

        assert!(text.starts_with("✅ Test succeeded"));
        assert!(text.contains("fine"));
        assert!(text.contains("\"x\": 1"));
        assert!(text.contains("[Confirm & save] (available)"));
    }
}
