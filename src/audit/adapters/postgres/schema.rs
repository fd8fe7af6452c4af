//! Diesel schema for audit trail persistence.

diesel::table! {
    /// Append-only audit trail entries.
    audit_logs (id) {
        /// Record identifier.
        id -> Uuid,
        /// Entity kind, e.g. `task`.
        #[max_length = 100]
        entity_type -> Varchar,
        /// Entity identifier rendered as text.
        #[max_length = 100]
        entity_id -> Varchar,
        /// Action tag.
        #[max_length = 50]
        action -> Varchar,
        /// Actor identity.
        #[max_length = 255]
        performed_by -> Varchar,
        /// Pre-mutation value snapshot.
        old_value -> Nullable<Text>,
        /// Post-mutation value snapshot.
        new_value -> Nullable<Text>,
        /// Free-text detail.
        details -> Nullable<Text>,
        /// When the mutation was recorded.
        recorded_at -> Timestamptz,
    }
}
