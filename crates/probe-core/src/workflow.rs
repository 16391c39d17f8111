//! Test workflow: one test dialog, from parameters to saved record.
//!
//! [`TestWorkflow`] owns a single [`SessionState`] and drives the editor,
//! invoker, renderer and saver around it. The session lock is only taken
//! inside synchronous sections and never held across an `.await`, so each
//! state transition is atomic while network calls interleave freely.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::ProbeResult;
use crate::invoker::TestInvoker;
use crate::messages::{SaveResult, TestParameters, ToolId};
use crate::params;
use crate::render::{render_session, Presentation};
use crate::saver::RecordSaver;
use crate::session::{Applied, SaveApplied, SaveTicket, SessionSnapshot, SessionState};
use crate::transport::{BackendInfo, ToolBackend};

/// Result of running a test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestRun {
    /// The outcome is now on screen
    Completed(Presentation),
    /// A newer test started while this one ran; its outcome was dropped
    Superseded,
}

/// Result of a save request that reached the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveReport {
    /// The save belongs to the live record; the session reflects it
    Completed {
        /// What the registry said
        result: SaveResult,
        /// Updated presentation
        presentation: Presentation,
    },
    /// The session moved on while the save was in flight
    Stale {
        /// Tool the save was for
        tool_id: ToolId,
        /// What the registry said
        result: SaveResult,
    },
}

/// One test-and-save interaction against a registry backend.
pub struct TestWorkflow<B> {
    backend: Arc<B>,
    invoker: TestInvoker<B>,
    saver: RecordSaver<B>,
    session: Mutex<SessionState>,
}

impl<B: ToolBackend> TestWorkflow<B> {
    /// Create a workflow with an empty session.
    pub fn new(backend: B) -> Self {
        Self::with_shared_backend(Arc::new(backend))
    }

    /// Create a workflow over a backend shared with other components.
    pub fn with_shared_backend(backend: Arc<B>) -> Self {
        Self {
            invoker: TestInvoker::new(Arc::clone(&backend)),
            saver: RecordSaver::new(Arc::clone(&backend)),
            backend,
            session: Mutex::new(SessionState::new()),
        }
    }

    /// Start a session for `tool_id`.
    pub fn begin_test(&self, tool_id: impl Into<ToolId>) -> Presentation {
        let mut session = self.session();
        session.begin_test(tool_id);
        render_session(&session.snapshot())
    }

    /// Parse `raw` and run the test.
    ///
    /// Malformed input fails before any request is made and leaves the
    /// session exactly as it was.
    pub async fn run_test(&self, raw: &str) -> ProbeResult<TestRun> {
        let params = params::parse(raw)?;
        self.run_test_with(params).await
    }

    /// Run the test with already-parsed parameters.
    pub async fn run_test_with(&self, params: TestParameters) -> ProbeResult<TestRun> {
        let ticket = self.session().start_invocation(&params)?;

        let outcome = self.invoker.invoke(ticket.tool_id(), &params).await;

        let mut session = self.session();
        match session.on_outcome(&ticket, outcome, params) {
            Applied::Current => Ok(TestRun::Completed(render_session(&session.snapshot()))),
            Applied::Superseded => {
                debug!("Test run {} superseded", ticket.seq());
                Ok(TestRun::Superseded)
            }
        }
    }

    /// Persist the verified record of the latest successful test.
    ///
    /// Fails with a save conflict, without any request, when there is no
    /// verified record or a save is already in flight or done.
    pub async fn confirm_and_save(&self) -> ProbeResult<SaveReport> {
        let ticket = self.session().confirm_save_requested()?;
        let cancel_guard = CancelledSaveGuard::new(&self.session, ticket.clone());

        let result = self.saver.save(ticket.tool_id(), ticket.record()).await;

        cancel_guard.disarm();
        let mut session = self.session();
        match session.on_save_outcome(&ticket, &result) {
            SaveApplied::Current(_) => Ok(SaveReport::Completed {
                result,
                presentation: render_session(&session.snapshot()),
            }),
            SaveApplied::Stale => {
                warn!(
                    "Save for tool {} completed after its session moved on: {}",
                    ticket.tool_id(),
                    if result.succeeded { "saved" } else { "failed" }
                );
                Ok(SaveReport::Stale {
                    tool_id: ticket.tool_id().clone(),
                    result,
                })
            }
        }
    }

    /// Current presentation of the session.
    pub fn presentation(&self) -> Presentation {
        render_session(&self.session().snapshot())
    }

    /// Copy of the session state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.session().snapshot()
    }

    /// Backend description.
    pub fn backend_info(&self) -> BackendInfo {
        self.backend.info()
    }

    fn session(&self) -> MutexGuard<'_, SessionState> {
        lock_session(&self.session)
    }
}

fn lock_session(session: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    // Entry points never panic midway through a transition.
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Message recorded when a save future is dropped before it finishes.
pub const SAVE_CANCELLED_MESSAGE: &str = "Save was cancelled before it finished";

/// Marks the save as failed if the `confirm_and_save` future is dropped
/// mid-request, so the operator can retry instead of staying in flight.
struct CancelledSaveGuard<'a> {
    session: &'a Mutex<SessionState>,
    ticket: Option<SaveTicket>,
}

impl<'a> CancelledSaveGuard<'a> {
    fn new(session: &'a Mutex<SessionState>, ticket: SaveTicket) -> Self {
        Self {
            session,
            ticket: Some(ticket),
        }
    }

    fn disarm(mut self) {
        self.ticket = None;
    }
}

impl Drop for CancelledSaveGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            warn!("Save for tool {} cancelled before completion", ticket.tool_id());
            lock_session(self.session)
                .on_save_outcome(&ticket, &SaveResult::failed(SAVE_CANCELLED_MESSAGE));
        }
    }
}

impl<B> std::fmt::Debug for TestWorkflow<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestWorkflow").finish_non_exhaustive()
    }
}
