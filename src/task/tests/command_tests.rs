//! Service orchestration tests for transactional task mutations.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for assertion clarity"
)]

use std::sync::Arc;

use super::support::{CollectingSubscriber, settle, wait_until};
use crate::audit::{adapters::InMemoryAuditSink, domain::AuditAction, ports::AuditSink};
use crate::dispatch::EventDispatcher;
use crate::task::{
    adapters::memory::{InMemoryTaskRepository, InMemoryUserDirectory},
    domain::{Task, TaskEvent, TaskId, TaskPriority, TaskStatus, User, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
    services::{CreateTaskRequest, TaskCommandError, TaskCommandService, UpdateTaskRequest},
};
use chrono::{DateTime, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestService = TaskCommandService<
    InMemoryTaskRepository,
    InMemoryUserDirectory,
    InMemoryAuditSink,
    DefaultClock,
>;

struct Harness {
    service: TestService,
    repository: Arc<InMemoryTaskRepository>,
    directory: Arc<InMemoryUserDirectory>,
    sink: Arc<InMemoryAuditSink>,
    subscriber: Arc<CollectingSubscriber>,
}

impl Harness {
    fn known_user(&self, username: &str, email: &str) -> UserId {
        let id = UserId::new();
        self.directory.insert(User::new(id, username, email));
        id
    }

    async fn audit_actions(&self, task_id: TaskId) -> Vec<AuditAction> {
        self.sink
            .find_for_entity("task", &task_id.to_string())
            .await
            .expect("audit lookup should succeed")
            .iter()
            .map(|record| record.action)
            .collect()
    }

    async fn wait_for_audits(&self, count: usize) {
        let sink = Arc::clone(&self.sink);
        wait_until(move || sink.len() == count).await;
    }

    async fn wait_for_events(&self, count: usize) {
        let subscriber = Arc::clone(&self.subscriber);
        wait_until(move || subscriber.events().len() == count).await;
    }
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let directory = Arc::new(InMemoryUserDirectory::new());
    let sink = Arc::new(InMemoryAuditSink::new());
    let subscriber = CollectingSubscriber::new();
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe(subscriber.clone());
    let service = TaskCommandService::new(
        Arc::clone(&repository),
        Arc::clone(&directory),
        Arc::clone(&sink),
        Arc::new(dispatcher),
        Arc::new(DefaultClock),
    );
    Harness {
        service,
        repository,
        directory,
        sink,
        subscriber,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_with_assignee_raises_created_then_assigned(harness: Harness) {
    let assignee = harness.known_user("alice", "alice@example.com");
    let task = harness
        .service
        .create(CreateTaskRequest::new("Ship release").with_assignee(assignee))
        .await
        .expect("task creation should succeed");

    harness.wait_for_events(2).await;
    assert_eq!(harness.subscriber.kinds(), vec!["created", "assigned"]);

    harness.wait_for_audits(1).await;
    assert_eq!(
        harness.audit_actions(task.id()).await,
        vec![AuditAction::Create]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_without_assignee_raises_only_created(harness: Harness) {
    harness
        .service
        .create(CreateTaskRequest::new("Tidy backlog"))
        .await
        .expect("task creation should succeed");

    harness.wait_for_events(1).await;
    assert_eq!(harness.subscriber.kinds(), vec!["created"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_defaults_status_and_priority(harness: Harness) {
    let task = harness
        .service
        .create(CreateTaskRequest::new("Audit dependencies"))
        .await
        .expect("task creation should succeed");

    assert_eq!(task.status(), TaskStatus::Todo);
    assert_eq!(task.priority(), TaskPriority::Medium);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_with_unknown_assignee_fails_and_persists_nothing(harness: Harness) {
    let result = harness
        .service
        .create(CreateTaskRequest::new("Ship release").with_assignee(UserId::new()))
        .await;

    assert!(matches!(result, Err(TaskCommandError::InvalidReference(_))));
    settle().await;
    assert!(harness.repository.is_empty());
    assert!(harness.subscriber.events().is_empty());
    assert!(harness.sink.is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_update_raises_one_event_and_one_status_change_audit(harness: Harness) {
    let task = harness
        .service
        .create(CreateTaskRequest::new("Ship release"))
        .await
        .expect("task creation should succeed");

    let updated = harness
        .service
        .update_status(task.id(), TaskStatus::InProgress)
        .await
        .expect("status update should succeed");
    assert!(updated.completed_at().is_none());
    assert_eq!(updated.status(), TaskStatus::InProgress);

    harness.wait_for_events(2).await;
    assert_eq!(harness.subscriber.kinds(), vec!["created", "status_changed"]);

    // create + status_change + update
    harness.wait_for_audits(3).await;
    let actions = harness.audit_actions(task.id()).await;
    let status_changes: Vec<_> = harness
        .sink
        .records()
        .into_iter()
        .filter(|record| record.action == AuditAction::StatusChange)
        .collect();
    assert_eq!(actions.len(), 3);
    assert_eq!(status_changes.len(), 1);
    let change = status_changes.first().expect("status change audit exists");
    assert_eq!(change.old_value.as_deref(), Some("todo"));
    assert_eq!(change.new_value.as_deref(), Some("in_progress"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completing_a_task_stamps_completed_at(harness: Harness) {
    let task = harness
        .service
        .create(CreateTaskRequest::new("Ship release"))
        .await
        .expect("task creation should succeed");

    let updated = harness
        .service
        .update_status(task.id(), TaskStatus::Completed)
        .await
        .expect("status update should succeed");

    assert!(updated.completed_at().is_some());
    let stored = harness
        .repository
        .find_by_id(task.id())
        .await
        .expect("lookup should succeed")
        .expect("task should exist");
    assert_eq!(stored.completed_at(), updated.completed_at());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unchanged_status_raises_no_status_event(harness: Harness) {
    let task = harness
        .service
        .create(CreateTaskRequest::new("Ship release"))
        .await
        .expect("task creation should succeed");

    harness
        .service
        .update_fields(
            task.id(),
            UpdateTaskRequest::new()
                .with_status(TaskStatus::Todo)
                .with_description("same status, new description"),
        )
        .await
        .expect("update should succeed");

    // create audit + update audit, no status_change
    harness.wait_for_audits(2).await;
    settle().await;
    assert_eq!(harness.subscriber.kinds(), vec!["created"]);
    assert!(
        harness
            .audit_actions(task.id())
            .await
            .iter()
            .all(|action| *action != AuditAction::StatusChange)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn partial_update_leaves_unpatched_fields_alone(harness: Harness) {
    let task = harness
        .service
        .create(
            CreateTaskRequest::new("Ship release")
                .with_description("cut the 2.0 branch")
                .with_priority(TaskPriority::High),
        )
        .await
        .expect("task creation should succeed");

    let updated = harness
        .service
        .update_fields(task.id(), UpdateTaskRequest::new().with_title("Ship 2.0"))
        .await
        .expect("update should succeed");

    assert_eq!(updated.title(), "Ship 2.0");
    assert_eq!(updated.description(), Some("cut the 2.0 branch"));
    assert_eq!(updated.priority(), TaskPriority::High);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_of_unknown_task_fails_with_not_found(harness: Harness) {
    let result = harness
        .service
        .update_status(TaskId::new(), TaskStatus::InProgress)
        .await;
    assert!(matches!(result, Err(TaskCommandError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassignment_raises_assigned_and_audits_old_and_new(harness: Harness) {
    let first = harness.known_user("alice", "alice@example.com");
    let second = harness.known_user("bob", "bob@example.com");
    let task = harness
        .service
        .create(CreateTaskRequest::new("Ship release").with_assignee(first))
        .await
        .expect("task creation should succeed");

    harness
        .service
        .update_assignee(task.id(), Some(second))
        .await
        .expect("reassignment should succeed");

    harness.wait_for_events(3).await;
    assert_eq!(
        harness.subscriber.kinds(),
        vec!["created", "assigned", "assigned"]
    );

    harness.wait_for_audits(2).await;
    let assign = harness
        .sink
        .records()
        .into_iter()
        .find(|record| record.action == AuditAction::Assign)
        .expect("assign audit exists");
    assert_eq!(assign.old_value.as_deref(), Some(first.to_string().as_str()));
    assert_eq!(
        assign.new_value.as_deref(),
        Some(second.to_string().as_str())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unassignment_records_unassign_audit(harness: Harness) {
    let assignee = harness.known_user("alice", "alice@example.com");
    let task = harness
        .service
        .create(CreateTaskRequest::new("Ship release").with_assignee(assignee))
        .await
        .expect("task creation should succeed");

    let updated = harness
        .service
        .update_assignee(task.id(), None)
        .await
        .expect("unassignment should succeed");
    assert_eq!(updated.assignee(), None);

    harness.wait_for_audits(2).await;
    let unassign = harness
        .sink
        .records()
        .into_iter()
        .find(|record| record.action == AuditAction::Unassign)
        .expect("unassign audit exists");
    assert_eq!(unassign.new_value.as_deref(), Some("none"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unchanged_assignee_is_a_no_op(harness: Harness) {
    let assignee = harness.known_user("alice", "alice@example.com");
    let task = harness
        .service
        .create(CreateTaskRequest::new("Ship release").with_assignee(assignee))
        .await
        .expect("task creation should succeed");
    harness.wait_for_events(2).await;

    harness
        .service
        .update_assignee(task.id(), Some(assignee))
        .await
        .expect("no-op reassignment should succeed");

    settle().await;
    assert_eq!(harness.subscriber.kinds(), vec!["created", "assigned"]);
    assert_eq!(harness.sink.len(), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_raises_deleted_and_audits_old_title(harness: Harness) {
    let task = harness
        .service
        .create(CreateTaskRequest::new("Ship release"))
        .await
        .expect("task creation should succeed");

    harness
        .service
        .delete(task.id())
        .await
        .expect("deletion should succeed");

    harness.wait_for_events(2).await;
    assert_eq!(harness.subscriber.kinds(), vec!["created", "deleted"]);
    assert!(harness.repository.is_empty());

    harness.wait_for_audits(2).await;
    let deletion = harness
        .sink
        .records()
        .into_iter()
        .find(|record| record.action == AuditAction::Delete)
        .expect("delete audit exists");
    assert_eq!(deletion.old_value.as_deref(), Some("Ship release"));
    assert_eq!(deletion.entity_id, task.id().to_string());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn mark_reminder_sent_twice_is_idempotent(harness: Harness) {
    let task = harness
        .service
        .create(CreateTaskRequest::new("Renew certificates"))
        .await
        .expect("task creation should succeed");

    let first = harness
        .service
        .mark_reminder_sent(task.id())
        .await
        .expect("first call should succeed");
    let second = harness
        .service
        .mark_reminder_sent(task.id())
        .await
        .expect("second call should succeed");

    assert!(first.reminder_sent());
    assert!(second.reminder_sent());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn send_reminder_raises_reminder_event(harness: Harness) {
    let task = harness
        .service
        .create(CreateTaskRequest::new("Renew certificates"))
        .await
        .expect("task creation should succeed");

    harness
        .service
        .send_reminder(task.id())
        .await
        .expect("reminder should succeed");

    harness.wait_for_events(2).await;
    assert_eq!(harness.subscriber.kinds(), vec!["created", "reminder"]);
}

mockall::mock! {
    Repo {}

    #[async_trait::async_trait]
    impl TaskRepository for Repo {
        async fn insert(&self, task: &Task) -> TaskRepositoryResult<()>;
        async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;
        async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;
        async fn find_due_for_reminder(
            &self,
            threshold: DateTime<Utc>,
        ) -> TaskRepositoryResult<Vec<Task>>;
        async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;
    }
}

fn failing_store_service(
    repository: MockRepo,
    subscriber: Arc<CollectingSubscriber>,
) -> TaskCommandService<MockRepo, InMemoryUserDirectory, InMemoryAuditSink, DefaultClock> {
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe(subscriber);
    TaskCommandService::new(
        Arc::new(repository),
        Arc::new(InMemoryUserDirectory::new()),
        Arc::new(InMemoryAuditSink::new()),
        Arc::new(dispatcher),
        Arc::new(DefaultClock),
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_insert_discards_buffered_events() {
    let mut repository = MockRepo::new();
    repository.expect_insert().returning(|task| {
        Err(TaskRepositoryError::persistence(std::io::Error::other(
            format!("refused insert of {}", task.id()),
        )))
    });
    let subscriber = CollectingSubscriber::new();
    let service = failing_store_service(repository, subscriber.clone());

    let result = service.create(CreateTaskRequest::new("Ship release")).await;

    assert!(matches!(result, Err(TaskCommandError::Repository(_))));
    settle().await;
    assert!(subscriber.events().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_update_discards_buffered_status_event() {
    let existing = Task::new(
        crate::task::domain::NewTask {
            title: "Ship release".to_owned(),
            ..crate::task::domain::NewTask::default()
        },
        &DefaultClock,
    )
    .expect("task creation should succeed");
    let existing_id = existing.id();

    let mut repository = MockRepo::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    repository.expect_update().returning(|task| {
        Err(TaskRepositoryError::persistence(std::io::Error::other(
            format!("refused update of {}", task.id()),
        )))
    });
    let subscriber = CollectingSubscriber::new();
    let service = failing_store_service(repository, subscriber.clone());

    let result = service
        .update_status(existing_id, TaskStatus::InProgress)
        .await;

    assert!(matches!(result, Err(TaskCommandError::Repository(_))));
    settle().await;
    assert!(subscriber.events().is_empty());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn event_snapshot_reflects_state_at_emission(harness: Harness) {
    let task = harness
        .service
        .create(CreateTaskRequest::new("Ship release"))
        .await
        .expect("task creation should succeed");

    harness
        .service
        .update_status(task.id(), TaskStatus::Completed)
        .await
        .expect("status update should succeed");

    harness.wait_for_events(2).await;
    let events = harness.subscriber.events();
    let status_event = events
        .iter()
        .find(|event| matches!(event, TaskEvent::StatusChanged(_)))
        .expect("status event raised");
    let snapshot = status_event.task().expect("snapshot carried");
    assert_eq!(snapshot.status(), TaskStatus::Completed);
    assert!(snapshot.completed_at().is_some());
}
