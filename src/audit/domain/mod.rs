//! Domain model for the append-only audit trail.
//!
//! An audit record is an immutable fact about who did what to which entity
//! and when. Records reference entities by type and identifier, never by
//! live object, so they survive deletion of the entity they describe.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for an audit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditRecordId(Uuid);

impl AuditRecordId {
    /// Creates a new random audit record identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an audit record identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for AuditRecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AuditRecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Action tag recorded with every audit entry.
///
/// The file and bulk-import tags belong to collaborators outside this
/// pipeline that append to the same trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// An entity was created.
    Create,
    /// An entity was updated.
    Update,
    /// An entity was deleted.
    Delete,
    /// A task's lifecycle status changed.
    StatusChange,
    /// A task was assigned to a user.
    Assign,
    /// A task's assignee was removed.
    Unassign,
    /// A file was attached to an entity.
    FileUpload,
    /// An attached file was removed.
    FileDelete,
    /// Entities were imported in bulk.
    BulkImport,
}

impl AuditAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::StatusChange => "status_change",
            Self::Assign => "assign",
            Self::Unassign => "unassign",
            Self::FileUpload => "file_upload",
            Self::FileDelete => "file_delete",
            Self::BulkImport => "bulk_import",
        }
    }
}

impl TryFrom<&str> for AuditAction {
    type Error = ParseAuditActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "status_change" => Ok(Self::StatusChange),
            "assign" => Ok(Self::Assign),
            "unassign" => Ok(Self::Unassign),
            "file_upload" => Ok(Self::FileUpload),
            "file_delete" => Ok(Self::FileDelete),
            "bulk_import" => Ok(Self::BulkImport),
            _ => Err(ParseAuditActionError(value.to_owned())),
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing audit actions from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown audit action: {0}")]
pub struct ParseAuditActionError(pub String);

/// Immutable audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Record identifier.
    pub id: AuditRecordId,
    /// Entity kind, e.g. `"task"`.
    pub entity_type: String,
    /// Entity identifier rendered as text.
    pub entity_id: String,
    /// What happened.
    pub action: AuditAction,
    /// Actor identity, a username or `"system"`.
    pub performed_by: String,
    /// Value before the mutation, when meaningful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<String>,
    /// Value after the mutation, when meaningful.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<String>,
    /// Free-text detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// When the mutation was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Creates a new audit record stamped with the current clock time.
    #[must_use]
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        action: AuditAction,
        performed_by: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: AuditRecordId::new(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            action,
            performed_by: performed_by.into(),
            old_value: None,
            new_value: None,
            details: None,
            recorded_at: clock.utc(),
        }
    }

    /// Sets the pre-mutation value snapshot.
    #[must_use]
    pub fn with_old_value(mut self, old_value: impl Into<String>) -> Self {
        self.old_value = Some(old_value.into());
        self
    }

    /// Sets the post-mutation value snapshot.
    #[must_use]
    pub fn with_new_value(mut self, new_value: impl Into<String>) -> Self {
        self.new_value = Some(new_value.into());
        self
    }

    /// Sets the free-text detail.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
