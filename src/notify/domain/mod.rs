//! Domain model for channel-agnostic notification messages.

use crate::task::domain::TaskId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Notification type tag keying the consumer's channel dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A task was assigned to the recipient.
    TaskAssigned,
    /// The status of the recipient's task changed.
    TaskStatusChanged,
    /// The recipient's task is approaching its due date.
    TaskReminder,
    /// The recipient's task is past its due date.
    TaskOverdue,
}

impl NotificationKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskAssigned => "task_assigned",
            Self::TaskStatusChanged => "task_status_changed",
            Self::TaskReminder => "task_reminder",
            Self::TaskOverdue => "task_overdue",
        }
    }
}

impl TryFrom<&str> for NotificationKind {
    type Error = ParseNotificationKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "task_assigned" => Ok(Self::TaskAssigned),
            "task_status_changed" => Ok(Self::TaskStatusChanged),
            "task_reminder" => Ok(Self::TaskReminder),
            "task_overdue" => Ok(Self::TaskOverdue),
            _ => Err(ParseNotificationKindError(value.to_owned())),
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing notification kinds from the wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown notification kind: {0}")]
pub struct ParseNotificationKindError(pub String);

/// Channel-agnostic notification payload.
///
/// Built by the publisher from a committed domain event, serialized onto
/// the broker, and consumed by delivery workers. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    /// Recipient address (an email address for the current channel set).
    pub recipient: String,
    /// Rendered subject line.
    pub subject: String,
    /// Rendered message body.
    pub body: String,
    /// Dispatch tag.
    pub kind: NotificationKind,
    /// Task that triggered the notification.
    pub task_id: TaskId,
    /// When the message was emitted.
    pub created_at: DateTime<Utc>,
}

impl NotificationMessage {
    /// Creates a message stamped with the current clock time.
    #[must_use]
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
        kind: NotificationKind,
        task_id: TaskId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
            kind,
            task_id,
            created_at: clock.utc(),
        }
    }
}
