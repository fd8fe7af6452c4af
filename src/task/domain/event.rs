//! Domain events describing task state transitions.

use super::{Task, TaskId};

/// A fact about a task mutation, raised inside the mutating transaction and
/// released to subscribers only after that transaction commits.
///
/// Events carry an owned snapshot of the task taken at the moment of
/// emission (or just the identifier for deletions). They are transient:
/// nothing persists them, and a crash before dispatch loses them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    /// A task was created.
    Created(Task),
    /// A task's lifecycle status changed.
    StatusChanged(Task),
    /// A task's assignee changed (including unassignment).
    Assigned(Task),
    /// A task is approaching its due date.
    Reminder(Task),
    /// A task was deleted.
    Deleted(TaskId),
}

impl TaskEvent {
    /// Returns a stable tag for logging and dispatch tables.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Created(_) => "created",
            Self::StatusChanged(_) => "status_changed",
            Self::Assigned(_) => "assigned",
            Self::Reminder(_) => "reminder",
            Self::Deleted(_) => "deleted",
        }
    }

    /// Returns the identifier of the task the event describes.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Created(task)
            | Self::StatusChanged(task)
            | Self::Assigned(task)
            | Self::Reminder(task) => task.id(),
            Self::Deleted(id) => *id,
        }
    }

    /// Returns the task snapshot carried by the event, when present.
    #[must_use]
    pub const fn task(&self) -> Option<&Task> {
        match self {
            Self::Created(task)
            | Self::StatusChanged(task)
            | Self::Assigned(task)
            | Self::Reminder(task) => Some(task),
            Self::Deleted(_) => None,
        }
    }
}
