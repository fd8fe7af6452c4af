//! Transactional task mutations with audit and event side effects.

use crate::audit::{
    domain::{AuditAction, AuditRecord},
    ports::AuditSink,
    services::AuditRecorder,
};
use crate::dispatch::{EventBuffer, EventDispatcher};
use crate::task::{
    domain::{
        NewTask, Task, TaskDomainError, TaskEvent, TaskId, TaskPriority, TaskStatus, User, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, UserDirectory, UserDirectoryError},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Entity type tag recorded with task audit entries.
const ENTITY_TYPE: &str = "task";

/// Actor recorded for mutations. Request identity lives in the HTTP layer
/// in front of this crate, so the mutator itself acts as the system.
const SYSTEM_ACTOR: &str = "system";

/// Request payload for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
    due_date: Option<DateTime<Utc>>,
    assignee_id: Option<UserId>,
    created_by_id: Option<UserId>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial status (defaults to `Todo`).
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the priority (defaults to `Medium`).
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the assignee reference.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Sets the creator reference.
    #[must_use]
    pub const fn with_created_by(mut self, created_by_id: UserId) -> Self {
        self.created_by_id = Some(created_by_id);
        self
    }
}

/// Partial-update request: only provided fields are applied.
///
/// Optional columns cannot be cleared through this request; unassignment
/// goes through [`TaskCommandService::update_assignee`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    priority: Option<TaskPriority>,
    due_date: Option<DateTime<Utc>>,
    status: Option<TaskStatus>,
    assignee_id: Option<UserId>,
}

impl UpdateTaskRequest {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a new priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets a new due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets a new lifecycle status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets a new assignee reference.
    #[must_use]
    pub const fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }
}

/// Service-level errors for task mutations.
#[derive(Debug, Clone, Error)]
pub enum TaskCommandError {
    /// The task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A supplied assignee or creator reference does not resolve.
    #[error("referenced user does not resolve: {0}")]
    InvalidReference(UserId),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),

    /// User directory lookup failed.
    #[error(transparent)]
    Directory(#[from] UserDirectoryError),
}

/// Result type for task mutation operations.
pub type TaskCommandResult<T> = Result<T, TaskCommandError>;

/// Owner of task state transitions.
///
/// Each operation is one transaction boundary: the repository call is the
/// commit point. Events raised during the operation stay in a buffer owned
/// by the operation and are released to the dispatcher only after the
/// repository reports success; any earlier failure drops the buffer, so a
/// rolled-back mutation never notifies. Audit records are appended
/// fire-and-forget after the commit point and never fail the mutation.
pub struct TaskCommandService<R, U, S, C>
where
    R: TaskRepository,
    U: UserDirectory,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    directory: Arc<U>,
    audit: AuditRecorder<S>,
    dispatcher: Arc<EventDispatcher>,
    clock: Arc<C>,
}

impl<R, U, S, C> TaskCommandService<R, U, S, C>
where
    R: TaskRepository,
    U: UserDirectory,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a new task command service.
    #[must_use]
    pub const fn new(
        repository: Arc<R>,
        directory: Arc<U>,
        audit_sink: Arc<S>,
        dispatcher: Arc<EventDispatcher>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            repository,
            directory,
            audit: AuditRecorder::new(audit_sink),
            dispatcher,
            clock,
        }
    }

    /// Creates a task, raising `Created` (and `Assigned` when an assignee
    /// is set) once the insert commits.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommandError::InvalidReference`] when a supplied
    /// assignee or creator does not resolve, and domain or repository
    /// errors when validation or the insert fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskCommandResult<Task> {
        let CreateTaskRequest {
            title,
            description,
            status,
            priority,
            due_date,
            assignee_id,
            created_by_id,
        } = request;

        if let Some(user_id) = assignee_id {
            self.ensure_user(user_id).await?;
        }
        if let Some(user_id) = created_by_id {
            self.ensure_user(user_id).await?;
        }

        let task = Task::new(
            NewTask {
                title,
                description,
                status,
                priority,
                due_date,
                assignee: assignee_id,
                created_by: created_by_id,
            },
            &*self.clock,
        )?;

        let mut events = EventBuffer::new();
        events.raise(TaskEvent::Created(task.clone()));
        if task.assignee().is_some() {
            events.raise(TaskEvent::Assigned(task.clone()));
        }

        self.repository.insert(&task).await?;

        self.append_audit(
            self.base_record(task.id(), AuditAction::Create)
                .with_new_value(task.title())
                .with_details("task created"),
        );
        let _flush = self.dispatcher.commit(events);
        info!(task_id = %task.id(), title = task.title(), "task created");
        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// A status change raises exactly one `StatusChanged` event and one
    /// `status_change` audit entry; an assignee change raises `Assigned`
    /// and an `assign` entry. Every committed update records an `update`
    /// entry.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommandError::NotFound`] when the task is absent,
    /// [`TaskCommandError::InvalidReference`] when a new assignee does not
    /// resolve, and domain or repository errors otherwise. On any error
    /// the buffered events are dropped unseen.
    pub async fn update_fields(
        &self,
        id: TaskId,
        patch: UpdateTaskRequest,
    ) -> TaskCommandResult<Task> {
        let mut task = self.load(id).await?;
        let mut events = EventBuffer::new();
        let mut records = Vec::new();

        let UpdateTaskRequest {
            title,
            description,
            priority,
            due_date,
            status,
            assignee_id,
        } = patch;

        if let Some(new_title) = title {
            task.rename(new_title, &*self.clock)?;
        }
        if let Some(new_description) = description {
            task.set_description(Some(new_description), &*self.clock);
        }
        if let Some(new_priority) = priority {
            task.set_priority(new_priority, &*self.clock);
        }
        if let Some(new_due_date) = due_date {
            task.set_due_date(Some(new_due_date), &*self.clock);
        }
        self.apply_status_patch(&mut task, status, &mut events, &mut records);
        self.apply_assignee_patch(&mut task, assignee_id, &mut events, &mut records)
            .await?;

        self.repository.update(&task).await?;

        records.push(
            self.base_record(task.id(), AuditAction::Update)
                .with_details("task updated"),
        );
        for record in records {
            self.append_audit(record);
        }
        let _flush = self.dispatcher.commit(events);
        info!(task_id = %task.id(), "task updated");
        Ok(task)
    }

    /// Transitions the lifecycle status.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`Self::update_fields`].
    pub async fn update_status(&self, id: TaskId, status: TaskStatus) -> TaskCommandResult<Task> {
        self.update_fields(id, UpdateTaskRequest::new().with_status(status))
            .await
    }

    /// Replaces the assignee; `None` unassigns.
    ///
    /// Any change raises `Assigned` (the publisher drops assignee-less
    /// events at recipient resolution) and records an `assign` or
    /// `unassign` audit entry. An unchanged assignee is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommandError::NotFound`] when the task is absent and
    /// [`TaskCommandError::InvalidReference`] when the new assignee does
    /// not resolve.
    pub async fn update_assignee(
        &self,
        id: TaskId,
        assignee: Option<UserId>,
    ) -> TaskCommandResult<Task> {
        let mut task = self.load(id).await?;
        if task.assignee() == assignee {
            return Ok(task);
        }
        if let Some(user_id) = assignee {
            self.ensure_user(user_id).await?;
        }

        let old_assignee = task.change_assignee(assignee, &*self.clock);
        let mut events = EventBuffer::new();
        events.raise(TaskEvent::Assigned(task.clone()));

        self.repository.update(&task).await?;

        let action = assignee.map_or(AuditAction::Unassign, |_| AuditAction::Assign);
        self.append_audit(
            self.base_record(task.id(), action)
                .with_old_value(render_user_ref(old_assignee))
                .with_new_value(render_user_ref(assignee))
                .with_details("task assignment changed"),
        );
        let _flush = self.dispatcher.commit(events);
        info!(task_id = %task.id(), "task assignment changed");
        Ok(task)
    }

    /// Deletes a task, raising `Deleted` once the removal commits.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommandError::NotFound`] when the task is absent.
    pub async fn delete(&self, id: TaskId) -> TaskCommandResult<()> {
        let task = self.load(id).await?;
        let mut events = EventBuffer::new();
        events.raise(TaskEvent::Deleted(id));

        self.repository.delete(id).await?;

        self.append_audit(
            self.base_record(id, AuditAction::Delete)
                .with_old_value(task.title())
                .with_details("task deleted"),
        );
        let _flush = self.dispatcher.commit(events);
        info!(task_id = %id, "task deleted");
        Ok(())
    }

    /// Sets the reminder flag.
    ///
    /// Idempotent: repeated calls leave the flag set without error. No
    /// event or audit entry is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommandError::NotFound`] when the task is absent.
    pub async fn mark_reminder_sent(&self, id: TaskId) -> TaskCommandResult<Task> {
        let mut task = self.load(id).await?;
        task.mark_reminder_sent(&*self.clock);
        self.repository.update(&task).await?;
        Ok(task)
    }

    /// Raises a `Reminder` event for the task through the commit-gated
    /// dispatch path used by interactive mutations.
    ///
    /// # Errors
    ///
    /// Returns [`TaskCommandError::NotFound`] when the task is absent.
    pub async fn send_reminder(&self, id: TaskId) -> TaskCommandResult<Task> {
        let task = self.load(id).await?;
        let mut events = EventBuffer::new();
        events.raise(TaskEvent::Reminder(task.clone()));
        let _flush = self.dispatcher.commit(events);
        info!(task_id = %task.id(), "reminder event raised");
        Ok(task)
    }

    /// Loads a task or fails with `NotFound`.
    async fn load(&self, id: TaskId) -> TaskCommandResult<Task> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(TaskCommandError::NotFound(id))
    }

    /// Resolves a user reference or fails with `InvalidReference`.
    async fn ensure_user(&self, id: UserId) -> TaskCommandResult<User> {
        self.directory
            .find_by_id(id)
            .await?
            .ok_or(TaskCommandError::InvalidReference(id))
    }

    fn apply_status_patch(
        &self,
        task: &mut Task,
        status: Option<TaskStatus>,
        events: &mut EventBuffer,
        records: &mut Vec<AuditRecord>,
    ) {
        if let Some(new_status) = status
            && new_status != task.status()
        {
            let old_status = task.change_status(new_status, &*self.clock);
            records.push(
                self.base_record(task.id(), AuditAction::StatusChange)
                    .with_old_value(old_status.as_str())
                    .with_new_value(new_status.as_str())
                    .with_details("task status changed"),
            );
            events.raise(TaskEvent::StatusChanged(task.clone()));
        }
    }

    async fn apply_assignee_patch(
        &self,
        task: &mut Task,
        assignee_id: Option<UserId>,
        events: &mut EventBuffer,
        records: &mut Vec<AuditRecord>,
    ) -> TaskCommandResult<()> {
        if let Some(new_assignee) = assignee_id
            && task.assignee() != Some(new_assignee)
        {
            self.ensure_user(new_assignee).await?;
            let old_assignee = task.change_assignee(Some(new_assignee), &*self.clock);
            records.push(
                self.base_record(task.id(), AuditAction::Assign)
                    .with_old_value(render_user_ref(old_assignee))
                    .with_new_value(new_assignee.to_string())
                    .with_details("task assigned"),
            );
            events.raise(TaskEvent::Assigned(task.clone()));
        }
        Ok(())
    }

    /// Builds the base audit record for a task mutation.
    fn base_record(&self, id: TaskId, action: AuditAction) -> AuditRecord {
        AuditRecord::new(
            ENTITY_TYPE,
            id.to_string(),
            action,
            SYSTEM_ACTOR,
            &*self.clock,
        )
    }

    /// Hands one record to the fire-and-forget recorder.
    fn append_audit(&self, record: AuditRecord) {
        let _append = self.audit.record(record);
    }
}

/// Renders an optional user reference for audit snapshots.
fn render_user_ref(user: Option<UserId>) -> String {
    user.map_or_else(|| "none".to_owned(), |id| id.to_string())
}
