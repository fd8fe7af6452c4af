//! In-memory audit sink for unit testing.

use crate::audit::{
    domain::AuditRecord,
    ports::{AuditSink, AuditSinkError, AuditSinkResult},
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory audit sink.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditSink {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` when no records are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a snapshot of the whole trail, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn append(&self, record: &AuditRecord) -> AuditSinkResult<()> {
        let mut guard = self
            .records
            .write()
            .map_err(|e| AuditSinkError::persistence(std::io::Error::other(e.to_string())))?;
        guard.push(record.clone());
        Ok(())
    }

    async fn find_for_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
    ) -> AuditSinkResult<Vec<AuditRecord>> {
        let guard = self
            .records
            .read()
            .map_err(|e| AuditSinkError::persistence(std::io::Error::other(e.to_string())))?;
        Ok(guard
            .iter()
            .filter(|record| record.entity_type == entity_type && record.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
