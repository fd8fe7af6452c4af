//! Fire-and-forget audit recording.

use crate::audit::{domain::AuditRecord, ports::AuditSink};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Appends audit records on a background task.
///
/// A mutation triggers the recorder and moves on: the request can complete
/// before the append finishes, and an append failure is logged, never
/// surfaced. The trail is therefore best-effort relative to crashes but
/// independent of notification outcome.
pub struct AuditRecorder<S>
where
    S: AuditSink + 'static,
{
    sink: Arc<S>,
}

impl<S> Clone for AuditRecorder<S>
where
    S: AuditSink + 'static,
{
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S> AuditRecorder<S>
where
    S: AuditSink + 'static,
{
    /// Creates a recorder over the given sink.
    #[must_use]
    pub const fn new(sink: Arc<S>) -> Self {
        Self { sink }
    }

    /// Appends one record on a background task.
    ///
    /// Callers detach the returned handle; tests may await it to observe
    /// the append.
    pub fn record(&self, record: AuditRecord) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            match sink.append(&record).await {
                Ok(()) => debug!(
                    entity_type = %record.entity_type,
                    entity_id = %record.entity_id,
                    action = %record.action,
                    "audit record appended"
                ),
                Err(error) => warn!(
                    entity_type = %record.entity_type,
                    entity_id = %record.entity_id,
                    action = %record.action,
                    %error,
                    "failed to append audit record"
                ),
            }
        })
    }
}
