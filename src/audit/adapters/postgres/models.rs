//! Diesel row models for audit trail persistence.

use super::schema::audit_logs;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for audit records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditLogRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Entity kind.
    pub entity_type: String,
    /// Entity identifier rendered as text.
    pub entity_id: String,
    /// Action tag in storage form.
    pub action: String,
    /// Actor identity.
    pub performed_by: String,
    /// Pre-mutation value snapshot.
    pub old_value: Option<String>,
    /// Post-mutation value snapshot.
    pub new_value: Option<String>,
    /// Free-text detail.
    pub details: Option<String>,
    /// When the mutation was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for audit records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_logs)]
pub struct NewAuditLogRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Entity kind.
    pub entity_type: String,
    /// Entity identifier rendered as text.
    pub entity_id: String,
    /// Action tag in storage form.
    pub action: String,
    /// Actor identity.
    pub performed_by: String,
    /// Pre-mutation value snapshot.
    pub old_value: Option<String>,
    /// Post-mutation value snapshot.
    pub new_value: Option<String>,
    /// Free-text detail.
    pub details: Option<String>,
    /// When the mutation was recorded.
    pub recorded_at: DateTime<Utc>,
}
