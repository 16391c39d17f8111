//! Record Saver: persists a verified test record through the registry.
//!
//! Only one submission is outstanding at a time. A second call while one is
//! running is refused locally without touching the network; idempotency
//! beyond that is the registry's job.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::messages::{SaveResult, ToolId};
use crate::session::VerifiedTestRecord;
use crate::transport::ToolBackend;

/// Message used when the registry rejects a save without explaining why.
pub const DEFAULT_SAVE_FAILURE_MESSAGE: &str = "Failed to save test record";

/// Submits verified records to the save endpoint.
#[derive(Debug)]
pub struct RecordSaver<B> {
    backend: Arc<B>,
    in_flight: AtomicBool,
}

impl<B: ToolBackend> RecordSaver<B> {
    /// Create a saver sharing the given backend.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a submission is outstanding.
    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Submit `record` for `tool_id`. Never fails; errors become a
    /// `SaveResult` with `succeeded == false`.
    pub async fn save(&self, tool_id: &ToolId, record: &VerifiedTestRecord) -> SaveResult {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Save for tool {} refused: another save is in flight", tool_id);
            return SaveResult::failed("A save is already in progress");
        }
        let _guard = InFlightGuard(&self.in_flight);

        let request = record.to_save_request();
        let result = match self.backend.save_test_record(tool_id, &request).await {
            Ok(reply) if reply.is_success() => SaveResult::saved(reply.success_message()),
            Ok(reply) => SaveResult::failed(
                reply
                    .failure_message()
                    .unwrap_or_else(|| DEFAULT_SAVE_FAILURE_MESSAGE.to_string()),
            ),
            Err(err) => SaveResult::failed(format!("{}: {}", DEFAULT_SAVE_FAILURE_MESSAGE, err)),
        };

        if result.succeeded {
            info!("Test record for tool {} saved", tool_id);
        } else {
            warn!(
                "Test record for tool {} not saved: {}",
                tool_id,
                result.message.as_deref().unwrap_or_default()
            );
        }
        result
    }
}

/// Clears the in-flight flag when the save future completes or is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
