//! Translation of committed task events into broker notifications.

use crate::dispatch::{EventSubscriber, SubscriberError};
use crate::notify::{
    domain::{NotificationKind, NotificationMessage},
    ports::{BrokerError, NotificationBroker},
};
use crate::task::{
    domain::{Task, TaskEvent, User, UserId},
    ports::{UserDirectory, UserDirectoryError},
};
use async_trait::async_trait;
use minijinja::Environment;
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Substitute rendered for absent optional fields in message bodies.
const ABSENT_FIELD: &str = "N/A";

const ASSIGNED_BODY: &str = "\
Hello {{ recipient_name }},

You have been assigned a new task:

Title: {{ title }}
Description: {{ description }}
Priority: {{ priority }}
Due Date: {{ due_date }}

Please review and start working on it.

Best regards,
Task Management System";

const STATUS_CHANGED_BODY: &str = "\
Hello {{ recipient_name }},

The status of your task has been updated:

Title: {{ title }}
New Status: {{ status }}
Priority: {{ priority }}

Best regards,
Task Management System";

const REMINDER_BODY: &str = "\
Hello {{ recipient_name }},

This is a reminder about your upcoming task:

Title: {{ title }}
Description: {{ description }}
Priority: {{ priority }}
Due Date: {{ due_date }}

Please ensure you complete it on time.

Best regards,
Task Management System";

const OVERDUE_BODY: &str = "\
Hello {{ recipient_name }},

The following task is now overdue:

Title: {{ title }}
Priority: {{ priority }}
Due Date: {{ due_date }}

Please update its status or due date.

Best regards,
Task Management System";

/// Publisher configuration.
///
/// Passed in at construction; the pipeline reads no ambient global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Global enable switch. When off, publishing is a logged no-op.
    pub enabled: bool,
    /// Broker topic the messages are appended to.
    pub topic: String,
}

impl NotificationConfig {
    /// Creates an enabled configuration for the given topic.
    #[must_use]
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            enabled: true,
            topic: topic.into(),
        }
    }

    /// Toggles the global enable switch.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self::new("notifications")
    }
}

/// Errors raised while building or appending a notification.
///
/// These never reach the request that caused the mutation: publishing runs
/// after commit on a background task, and the dispatcher logs and drops
/// subscriber failures.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The assignee reference could not be resolved against the directory.
    #[error("recipient lookup failed for user {user_id}: {source}")]
    RecipientLookup {
        /// Assignee whose lookup failed.
        user_id: UserId,
        /// Underlying directory failure.
        source: UserDirectoryError,
    },

    /// A message body template failed to render.
    #[error("template rendering failed for {kind}: {reason}")]
    Template {
        /// Notification kind whose template failed.
        kind: NotificationKind,
        /// Renderer diagnostic.
        reason: String,
    },

    /// The broker rejected the append.
    #[error(transparent)]
    Broker(#[from] BrokerError),
}

/// Context handed to the body templates.
#[derive(Debug, Serialize)]
struct BodyContext<'a> {
    recipient_name: &'a str,
    title: &'a str,
    description: &'a str,
    status: &'a str,
    priority: &'a str,
    due_date: String,
}

/// Maps committed task events onto broker notifications.
///
/// Subscribed to the commit-gated dispatcher; only events with a defined
/// notification mapping produce a message, and an event without a
/// resolvable recipient is dropped silently because "no one to notify" is
/// not a failure.
pub struct NotificationPublisher<B, U, C>
where
    B: NotificationBroker,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    broker: Arc<B>,
    directory: Arc<U>,
    config: NotificationConfig,
    clock: Arc<C>,
}

impl<B, U, C> NotificationPublisher<B, U, C>
where
    B: NotificationBroker,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a publisher over the given broker and directory.
    #[must_use]
    pub const fn new(
        broker: Arc<B>,
        directory: Arc<U>,
        config: NotificationConfig,
        clock: Arc<C>,
    ) -> Self {
        Self {
            broker,
            directory,
            config,
            clock,
        }
    }

    /// Builds and appends the notification for one committed event.
    ///
    /// Events without a notification mapping (`Created`, `Deleted`) and
    /// events whose task has no assignee are dropped without error.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when recipient lookup, template rendering,
    /// or the broker append fails.
    pub async fn publish(&self, event: &TaskEvent) -> Result<(), PublishError> {
        let Some((kind, task)) = notification_mapping(event) else {
            debug!(event = event.kind(), task_id = %event.task_id(), "no notification mapping; dropping event");
            return Ok(());
        };

        if !self.config.enabled {
            info!(
                event = event.kind(),
                task_id = %task.id(),
                "notifications disabled; suppressing"
            );
            return Ok(());
        }

        let Some(recipient) = self.resolve_recipient(task).await? else {
            return Ok(());
        };

        let message = compose(kind, task, &recipient, &*self.clock)?;
        self.broker.append(&self.config.topic, &message).await?;
        info!(
            kind = %kind,
            task_id = %task.id(),
            recipient = %message.recipient,
            topic = %self.config.topic,
            "notification published"
        );
        Ok(())
    }

    /// Resolves the task's assignee to a directory user.
    ///
    /// A task without an assignee resolves to `None`; so does a dangling
    /// assignee reference, which is logged because it points at stale data.
    async fn resolve_recipient(&self, task: &Task) -> Result<Option<User>, PublishError> {
        let Some(user_id) = task.assignee() else {
            debug!(task_id = %task.id(), "task has no assignee; nothing to notify");
            return Ok(None);
        };

        let found = self
            .directory
            .find_by_id(user_id)
            .await
            .map_err(|source| PublishError::RecipientLookup { user_id, source })?;
        if found.is_none() {
            warn!(task_id = %task.id(), %user_id, "assignee not found in directory; dropping notification");
        }
        Ok(found)
    }
}

#[async_trait]
impl<B, U, C> EventSubscriber for NotificationPublisher<B, U, C>
where
    B: NotificationBroker + 'static,
    U: UserDirectory + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "notification_publisher"
    }

    async fn on_event(&self, event: &TaskEvent) -> Result<(), SubscriberError> {
        self.publish(event).await.map_err(SubscriberError::new)
    }
}

/// Returns the notification kind for events that notify, with the task
/// snapshot the message is built from.
const fn notification_mapping(event: &TaskEvent) -> Option<(NotificationKind, &Task)> {
    match event {
        TaskEvent::Assigned(task) => Some((NotificationKind::TaskAssigned, task)),
        TaskEvent::StatusChanged(task) => Some((NotificationKind::TaskStatusChanged, task)),
        TaskEvent::Reminder(task) => Some((NotificationKind::TaskReminder, task)),
        TaskEvent::Created(_) | TaskEvent::Deleted(_) => None,
    }
}

/// Renders the subject and body for one notification.
fn compose(
    kind: NotificationKind,
    task: &Task,
    recipient: &User,
    clock: &impl Clock,
) -> Result<NotificationMessage, PublishError> {
    let subject = match kind {
        NotificationKind::TaskAssigned => format!("New Task Assigned: {}", task.title()),
        NotificationKind::TaskStatusChanged => format!("Task Status Updated: {}", task.title()),
        NotificationKind::TaskReminder => format!("Task Reminder: {}", task.title()),
        NotificationKind::TaskOverdue => format!("Task Overdue: {}", task.title()),
    };

    let template = match kind {
        NotificationKind::TaskAssigned => ASSIGNED_BODY,
        NotificationKind::TaskStatusChanged => STATUS_CHANGED_BODY,
        NotificationKind::TaskReminder => REMINDER_BODY,
        NotificationKind::TaskOverdue => OVERDUE_BODY,
    };

    let context = BodyContext {
        recipient_name: recipient.display_name(),
        title: task.title(),
        description: task.description().unwrap_or(ABSENT_FIELD),
        status: task.status().as_str(),
        priority: task.priority().as_str(),
        due_date: task.due_date().map_or_else(
            || ABSENT_FIELD.to_owned(),
            |due| due.format("%Y-%m-%d %H:%M UTC").to_string(),
        ),
    };

    let environment = Environment::new();
    let body = environment
        .render_str(template, &context)
        .map_err(|error| PublishError::Template {
            kind,
            reason: error.to_string(),
        })?;

    Ok(NotificationMessage::new(
        recipient.email(),
        subject,
        body,
        kind,
        task.id(),
        clock,
    ))
}
