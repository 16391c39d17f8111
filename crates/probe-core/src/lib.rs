//! # Tool Probe Core
//!
//! Core library for testing registered tool definitions against a tool
//! registry and recording verified results.
//!
//! The crate models one test dialog as an explicit state machine:
//!
//! - **Parameter Editor** ([`params`]): raw operator text to structured JSON
//! - **Test Invoker** ([`invoker`]): one HTTP test call, normalized into a [`TestOutcome`]
//! - **Result Renderer** ([`render`]): pure outcome-to-presentation mapping
//! - **Session State** ([`session`]): owns the tool under test, the verified record and save state
//! - **Record Saver** ([`saver`]): persists a verified record through the registry
//!
//! [`workflow::TestWorkflow`] wires these together behind async entry points.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tool_probe_core::{
//!     transport::{BackendConfig, HttpBackend},
//!     workflow::{TestRun, TestWorkflow},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = HttpBackend::new(BackendConfig::new("http://localhost:8080")?)?;
//! let workflow = TestWorkflow::new(backend);
//!
//! workflow.begin_test("42");
//! if let TestRun::Completed(presentation) = workflow.run_test(r#"{"city": "Paris"}"#).await? {
//!     println!("{}", presentation.to_text());
//!     if presentation.save_action.enabled {
//!         workflow.confirm_and_save().await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::uninlined_format_args)]

pub mod error;
pub mod import;
pub mod invoker;
pub mod messages;
pub mod params;
pub mod render;
pub mod saver;
pub mod session;
pub mod transport;
pub mod workflow;

pub use error::{ProbeError, ProbeResult};
pub use messages::{SaveResult, TestOutcome, TestParameters, ToolId};
pub use session::{SaveState, SessionState, VerifiedTestRecord};
