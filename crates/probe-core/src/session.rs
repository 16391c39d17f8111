//! Session State: the single mutable resource of a test dialog.
//!
//! A session owns the tool under test, the current parameters, the last
//! outcome, the verified record derived from it and the save state. Every
//! mutation goes through one of the entry points below, each of which runs
//! to completion synchronously.
//!
//! Async results are matched back to the call that produced them through
//! sequence tokens:
//!
//! - [`InvocationTicket`] is handed out when a test starts. Starting another
//!   test (or another session) bumps the sequence, so a late outcome carrying
//!   an older ticket is discarded instead of overwriting what is on screen.
//! - [`SaveTicket`] is handed out when a save is accepted and names the
//!   invocation whose record it submits. A save result for a record that is
//!   no longer live is reported as stale and leaves the session untouched.
//!
//! ```text
//! NotAttempted --confirm--> InFlight --ok--> Saved (terminal)
//!                              |
//!                              +--err--> Failed --confirm--> InFlight
//!
//! begin_test / start_invocation from any state --> NotAttempted, no record
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{ProbeError, ProbeResult};
use crate::messages::{SaveRecordRequest, SaveResult, TestOutcome, TestParameters, ToolId};

/// Progress of persisting the current verified record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveState {
    /// No save attempted for the current record
    #[default]
    NotAttempted,
    /// A save request is outstanding
    InFlight,
    /// Record persisted; terminal until a new test starts
    Saved,
    /// Last save attempt failed; may be retried
    Failed,
}

impl SaveState {
    /// Whether a save may be requested from this state, given a record exists.
    pub fn accepts_save(self) -> bool {
        matches!(self, Self::NotAttempted | Self::Failed)
    }
}

/// Parameters and result of the latest successful test, eligible to save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerifiedTestRecord {
    /// Parameters the test ran with
    pub parameters: TestParameters,
    /// Detail payload the test returned
    pub result: Option<Value>,
}

impl VerifiedTestRecord {
    /// Body for the save endpoint.
    pub fn to_save_request(&self) -> SaveRecordRequest {
        SaveRecordRequest {
            test_parameters: self.parameters.clone(),
            test_result: self.result.clone().unwrap_or(Value::Null),
        }
    }
}

/// Token identifying one test invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationTicket {
    seq: u64,
    tool_id: ToolId,
}

impl InvocationTicket {
    /// Sequence number of the invocation.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Tool being invoked.
    pub fn tool_id(&self) -> &ToolId {
        &self.tool_id
    }
}

/// Token identifying one accepted save request.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    seq: u64,
    tool_id: ToolId,
    record: VerifiedTestRecord,
}

impl SaveTicket {
    /// Invocation sequence whose record is being saved.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Tool the record belongs to.
    pub fn tool_id(&self) -> &ToolId {
        &self.tool_id
    }

    /// Record to submit.
    pub fn record(&self) -> &VerifiedTestRecord {
        &self.record
    }
}

/// What happened to an outcome handed to [`SessionState::on_outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Outcome is now the session's current outcome
    Current,
    /// A newer invocation exists; the outcome was dropped
    Superseded,
}

/// What happened to a result handed to [`SessionState::on_save_outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveApplied {
    /// Session moved to the given save state
    Current(SaveState),
    /// The record the save referred to is no longer live
    Stale,
}

/// Read-only copy of the session for rendering and logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Tool under test
    pub tool_id: Option<ToolId>,
    /// Whether a test call is outstanding
    pub pending: bool,
    /// Parameters of the latest invocation
    pub parameters: Option<TestParameters>,
    /// Latest applied outcome
    pub outcome: Option<TestOutcome>,
    /// Verified record, if the latest outcome succeeded
    pub verified: Option<VerifiedTestRecord>,
    /// Save progress for the verified record
    pub save_state: SaveState,
    /// Message of the latest save attempt
    pub save_message: Option<String>,
}

/// State of one test-and-save interaction.
#[derive(Debug, Default)]
pub struct SessionState {
    tool_id: Option<ToolId>,
    seq: u64,
    pending: Option<u64>,
    parameters: Option<TestParameters>,
    outcome: Option<TestOutcome>,
    verified: Option<VerifiedTestRecord>,
    save_state: SaveState,
    save_message: Option<String>,
}

impl SessionState {
    /// Create an empty session with no tool selected.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session for `tool_id`, discarding everything from the last one.
    ///
    /// Any invocation or save still in flight becomes stale.
    pub fn begin_test(&mut self, tool_id: impl Into<ToolId>) {
        let tool_id = tool_id.into();
        info!("Beginning test session for tool {}", tool_id);

        self.tool_id = Some(tool_id);
        self.seq += 1;
        self.pending = None;
        self.parameters = None;
        self.outcome = None;
        self.clear_record();
    }

    /// Enter the pending state for a new invocation.
    ///
    /// The verified record is dropped immediately, before any result
    /// arrives, so a record can only ever refer to the outcome on screen.
    pub fn start_invocation(&mut self, params: &TestParameters) -> ProbeResult<InvocationTicket> {
        let tool_id = self.tool_id.clone().ok_or(ProbeError::NoActiveTool)?;

        self.seq += 1;
        self.pending = Some(self.seq);
        self.parameters = Some(params.clone());
        self.clear_record();

        debug!("Invocation {} started for tool {}", self.seq, tool_id);
        Ok(InvocationTicket {
            seq: self.seq,
            tool_id,
        })
    }

    /// Apply the outcome of the invocation identified by `ticket`.
    pub fn on_outcome(
        &mut self,
        ticket: &InvocationTicket,
        outcome: TestOutcome,
        params: TestParameters,
    ) -> Applied {
        if self.pending != Some(ticket.seq) || self.tool_id.as_ref() != Some(&ticket.tool_id) {
            warn!(
                "Discarding outcome of superseded invocation {} for tool {}",
                ticket.seq, ticket.tool_id
            );
            return Applied::Superseded;
        }

        self.pending = None;
        self.save_state = SaveState::NotAttempted;
        self.save_message = None;
        self.verified = if outcome.is_success() {
            Some(VerifiedTestRecord {
                parameters: params.clone(),
                result: outcome.detail().cloned(),
            })
        } else {
            None
        };
        self.parameters = Some(params);
        self.outcome = Some(outcome);

        debug!(
            "Invocation {} applied, verified record present: {}",
            ticket.seq,
            self.verified.is_some()
        );
        Applied::Current
    }

    /// Accept a request to persist the verified record.
    ///
    /// Rejected with [`ProbeError::SaveConflict`] when there is nothing to
    /// save or a save is already outstanding or done; the session is left
    /// unchanged in that case.
    pub fn confirm_save_requested(&mut self) -> ProbeResult<SaveTicket> {
        let record = match &self.verified {
            Some(record) => record.clone(),
            None if self.pending.is_some() => {
                return Err(ProbeError::save_conflict("a test is still running"))
            }
            None => {
                return Err(ProbeError::save_conflict(
                    "no successful test result to save",
                ))
            }
        };

        match self.save_state {
            SaveState::InFlight => {
                return Err(ProbeError::save_conflict("a save is already in progress"))
            }
            SaveState::Saved => {
                return Err(ProbeError::save_conflict(
                    "this test result has already been saved",
                ))
            }
            SaveState::NotAttempted | SaveState::Failed => {}
        }

        let tool_id = self.tool_id.clone().ok_or(ProbeError::NoActiveTool)?;
        self.save_state = SaveState::InFlight;
        self.save_message = None;

        info!("Saving verified test record for tool {}", tool_id);
        Ok(SaveTicket {
            seq: self.seq,
            tool_id,
            record,
        })
    }

    /// Apply the result of the save identified by `ticket`.
    ///
    /// A failed save keeps the verified record so it can be retried
    /// without re-running the test.
    pub fn on_save_outcome(&mut self, ticket: &SaveTicket, result: &SaveResult) -> SaveApplied {
        let live = self.seq == ticket.seq
            && self.tool_id.as_ref() == Some(&ticket.tool_id)
            && self.save_state == SaveState::InFlight
            && self.verified.as_ref() == Some(&ticket.record);
        if !live {
            warn!(
                "Discarding save result for tool {} (invocation {}): record is no longer current",
                ticket.tool_id, ticket.seq
            );
            return SaveApplied::Stale;
        }

        self.save_state = if result.succeeded {
            SaveState::Saved
        } else {
            SaveState::Failed
        };
        self.save_message = result.message.clone();

        info!(
            "Save for tool {} finished: {:?}",
            ticket.tool_id, self.save_state
        );
        SaveApplied::Current(self.save_state)
    }

    /// Tool under test.
    pub fn tool_id(&self) -> Option<&ToolId> {
        self.tool_id.as_ref()
    }

    /// Whether a test call is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Parameters of the latest invocation.
    pub fn parameters(&self) -> Option<&TestParameters> {
        self.parameters.as_ref()
    }

    /// Latest applied outcome.
    pub fn outcome(&self) -> Option<&TestOutcome> {
        self.outcome.as_ref()
    }

    /// Verified record, if any.
    pub fn verified(&self) -> Option<&VerifiedTestRecord> {
        self.verified.as_ref()
    }

    /// Save progress.
    pub fn save_state(&self) -> SaveState {
        self.save_state
    }

    /// Copy the session for rendering.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            tool_id: self.tool_id.clone(),
            pending: self.pending.is_some(),
            parameters: self.parameters.clone(),
            outcome: self.outcome.clone(),
            verified: self.verified.clone(),
            save_state: self.save_state,
            save_message: self.save_message.clone(),
        }
    }

    fn clear_record(&mut self) {
        self.verified = None;
        self.save_state = SaveState::NotAttempted;
        self.save_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn succeeded(detail: Value) -> TestOutcome {
        TestOutcome::succeeded(None, Some(detail))
    }

    fn session_with_success() -> SessionState {
        let mut session = SessionState::new();
        session.begin_test("7");
        let params = json!({"a": 1});
        let ticket = session.start_invocation(&params).unwrap();
        assert_eq!(
            session.on_outcome(&ticket, succeeded(json!({"x": 1})), params),
            Applied::Current
        );
        session
    }

    #[test]
    fn test_begin_test_resets() {
        let mut session = session_with_success();
        assert!(session.verified().is_some());

        session.begin_test("8");
        assert_eq!(session.tool_id(), Some(&ToolId::new("8")));
        assert!(session.verified().is_none());
        assert!(session.outcome().is_none());
        assert_eq!(session.save_state(), SaveState::NotAttempted);
    }

    #[test]
    fn test_invocation_requires_tool() {
        let mut session = SessionState::new();
        assert_eq!(
            session.start_invocation(&json!({})).unwrap_err(),
            ProbeError::NoActiveTool
        );
    }

    #[test]
    fn test_success_creates_record() {
        let session = session_with_success();
        let record = session.verified().unwrap();
        assert_eq!(record.parameters, json!({"a": 1}));
        assert_eq!(record.result, Some(json!({"x": 1})));
        assert!(!session.is_pending());
    }

    #[test]
    fn test_failure_clears_record() {
        let mut session = session_with_success();
        let ticket = session.start_invocation(&json!({"a": 2})).unwrap();
        session.on_outcome(&ticket, TestOutcome::http_error(500), json!({"a": 2}));

        assert!(session.verified().is_none());
        assert_eq!(session.outcome().unwrap().http_status(), Some(500));
    }

    #[test]
    fn test_pending_invalidates_record_before_result() {
        let mut session = session_with_success();
        let _ticket = session.start_invocation(&json!({"a": 2})).unwrap();

        assert!(session.is_pending());
        assert!(session.verified().is_none());
        assert_eq!(session.save_state(), SaveState::NotAttempted);
        assert!(matches!(
            session.confirm_save_requested(),
            Err(ProbeError::SaveConflict { .. })
        ));
    }

    #[test]
    fn test_superseded_outcome_is_discarded() {
        let mut session = SessionState::new();
        session.begin_test("7");
        let first = session.start_invocation(&json!({"n": 1})).unwrap();
        let second = session.start_invocation(&json!({"n": 2})).unwrap();
        assert!(second.seq() > first.seq());

        assert_eq!(
            session.on_outcome(&second, succeeded(json!("second")), json!({"n": 2})),
            Applied::Current
        );
        assert_eq!(
            session.on_outcome(&first, succeeded(json!("first")), json!({"n": 1})),
            Applied::Superseded
        );

        let record = session.verified().unwrap();
        assert_eq!(record.parameters, json!({"n": 2}));
        assert_eq!(record.result, Some(json!("second")));
    }

    #[test]
    fn test_outcome_for_previous_session_is_discarded() {
        let mut session = SessionState::new();
        session.begin_test("7");
        let ticket = session.start_invocation(&json!({})).unwrap();
        session.begin_test("8");

        assert_eq!(
            session.on_outcome(&ticket, succeeded(json!(1)), json!({})),
            Applied::Superseded
        );
        assert!(session.verified().is_none());
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_confirm_without_record_is_conflict() {
        let mut session = SessionState::new();
        session.begin_test("7");
        let err = session.confirm_save_requested().unwrap_err();
        assert!(matches!(err, ProbeError::SaveConflict { .. }));
        assert_eq!(session.save_state(), SaveState::NotAttempted);
    }

    #[test]
    fn test_save_success_is_terminal() {
        let mut session = session_with_success();
        let ticket = session.confirm_save_requested().unwrap();
        assert_eq!(session.save_state(), SaveState::InFlight);
        assert_eq!(ticket.record().to_save_request().test_result, json!({"x": 1}));

        // Double submission while in flight.
        assert!(session.confirm_save_requested().is_err());

        assert_eq!(
            session.on_save_outcome(&ticket, &SaveResult::saved(None)),
            SaveApplied::Current(SaveState::Saved)
        );
        assert!(session.confirm_save_requested().is_err());
        assert_eq!(session.save_state(), SaveState::Saved);
    }

    #[test]
    fn test_save_failure_allows_retry() {
        let mut session = session_with_success();
        let ticket = session.confirm_save_requested().unwrap();
        assert_eq!(
            session.on_save_outcome(&ticket, &SaveResult::failed("duplicate")),
            SaveApplied::Current(SaveState::Failed)
        );
        assert!(session.verified().is_some());
        assert_eq!(
            session.snapshot().save_message.as_deref(),
            Some("duplicate")
        );

        let retry = session.confirm_save_requested().unwrap();
        assert_eq!(retry.record(), ticket.record());
        assert_eq!(session.save_state(), SaveState::InFlight);
    }

    #[test]
    fn test_stale_save_leaves_new_session_untouched() {
        let mut session = session_with_success();
        let ticket = session.confirm_save_requested().unwrap();

        session.begin_test("9");
        assert_eq!(
            session.on_save_outcome(&ticket, &SaveResult::saved(None)),
            SaveApplied::Stale
        );
        assert_eq!(session.save_state(), SaveState::NotAttempted);
        assert_eq!(session.tool_id(), Some(&ToolId::new("9")));
    }

    #[test]
    fn test_save_result_after_new_invocation_is_stale() {
        let mut session = session_with_success();
        let ticket = session.confirm_save_requested().unwrap();
        let _ = session.start_invocation(&json!({"a": 3})).unwrap();

        assert_eq!(
            session.on_save_outcome(&ticket, &SaveResult::saved(None)),
            SaveApplied::Stale
        );
        assert_eq!(session.save_state(), SaveState::NotAttempted);
    }

    #[test]
    fn test_success_without_detail_saves_null_result() {
        let mut session = SessionState::new();
        session.begin_test("7");
        let ticket = session.start_invocation(&json!({})).unwrap();
        session.on_outcome(&ticket, TestOutcome::succeeded(None, None), json!({}));

        let request = session.verified().unwrap().to_save_request();
        assert_eq!(request.test_result, Value::Null);
    }
}
