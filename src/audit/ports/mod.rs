//! Port contracts for the audit trail.

use crate::audit::domain::AuditRecord;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for audit sink operations.
pub type AuditSinkResult<T> = Result<T, AuditSinkError>;

/// Append-only audit storage.
///
/// Records are never updated or deleted. The recorder service appends on a
/// background task, so implementations must tolerate appends racing reads.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Appends one record to the trail.
    ///
    /// # Errors
    ///
    /// Returns [`AuditSinkError::Persistence`] when the append fails.
    async fn append(&self, record: &AuditRecord) -> AuditSinkResult<()>;

    /// Returns the trail for one entity, oldest first.
    async fn find_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> AuditSinkResult<Vec<AuditRecord>>;
}

/// Errors returned by audit sink implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditSinkError {
    /// Persistence-layer failure.
    #[error("audit persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditSinkError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
