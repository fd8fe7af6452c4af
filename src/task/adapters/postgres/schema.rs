//! Diesel schema for task persistence.

diesel::table! {
    /// Task records with lifecycle and reminder state.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Optional free-text description.
        description -> Nullable<Text>,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Urgency ranking.
        #[max_length = 50]
        priority -> Varchar,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Optional assignee reference.
        assignee_id -> Nullable<Uuid>,
        /// Optional creator reference.
        created_by_id -> Nullable<Uuid>,
        /// Whether a due-date reminder has been issued.
        reminder_sent -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last mutation timestamp.
        updated_at -> Timestamptz,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
    }
}
