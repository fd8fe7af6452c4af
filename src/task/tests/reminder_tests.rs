//! Reminder scanner tests.
#![expect(
    clippy::expect_used,
    reason = "test code uses expect for assertion clarity"
)]

use std::sync::Arc;
use std::time::Duration;

use super::support::{CollectingSubscriber, wait_until};
use crate::audit::adapters::InMemoryAuditSink;
use crate::dispatch::EventDispatcher;
use crate::task::{
    adapters::memory::{InMemoryTaskRepository, InMemoryUserDirectory},
    domain::{NewTask, Task, TaskId, TaskStatus},
    ports::{TaskRepository, TaskRepositoryResult},
    services::{CreateTaskRequest, ReminderConfig, ReminderScanner, TaskCommandService},
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
type TestScanner = ReminderScanner<
    InMemoryTaskRepository,
    InMemoryUserDirectory,
    InMemoryAuditSink,
    DefaultClock,
>;

struct Harness {
    service: Arc<TestService>,
    scanner: TestScanner,
    subscriber: Arc<CollectingSubscriber>,
}

#[fixture]
fn harness() -> Harness {
    let repository = Arc::new(InMemoryTaskRepository::new());
    let subscriber = CollectingSubscriber::new();
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe(subscriber.clone());
    let service = Arc::new(TaskCommandService::new(
        Arc::clone(&repository),
        Arc::new(InMemoryUserDirectory::new()),
        Arc::new(InMemoryAuditSink::new()),
        Arc::new(dispatcher),
        Arc::new(DefaultClock),
    ));
    let scanner = ReminderScanner::new(
        Arc::clone(&service),
        repository,
        ReminderConfig::new(24, Duration::from_secs(3600)),
        Arc::new(DefaultClock),
    );
    Harness {
        service,
        scanner,
        subscriber,
    }
}

fn due_in_hours(hours: i64) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::hours(hours)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scan_selects_due_unsent_active_tasks_once(harness: Harness) {
    let due_soon = harness
        .service
        .create(
            CreateTaskRequest::new("Renew certificates")
                .with_status(TaskStatus::InProgress)
                .with_due_date(due_in_hours(10)),
        )
        .await
        .expect("task creation should succeed");
    harness
        .service
        .create(CreateTaskRequest::new("Plan offsite").with_due_date(due_in_hours(48)))
        .await
        .expect("task creation should succeed");
    harness
        .service
        .create(
            CreateTaskRequest::new("Already done")
                .with_status(TaskStatus::Completed)
                .with_due_date(due_in_hours(2)),
        )
        .await
        .expect("task creation should succeed");

    let summary = harness
        .scanner
        .scan_once()
        .await
        .expect("scan should succeed");
    assert_eq!(summary.selected, 1);
    assert_eq!(summary.reminded, 1);
    assert_eq!(summary.failed, 0);

    let subscriber = Arc::clone(&harness.subscriber);
    wait_until(move || {
        subscriber
            .kinds()
            .iter()
            .filter(|kind| **kind == "reminder")
            .count()
            == 1
    })
    .await;

    // The reminder flag is set in a separate update, so an immediate
    // re-scan selects nothing.
    let rescan = harness
        .scanner
        .scan_once()
        .await
        .expect("re-scan should succeed");
    assert_eq!(rescan.selected, 0);

    let reminded = harness
        .service
        .mark_reminder_sent(due_soon.id())
        .await
        .expect("flag lookup should succeed");
    assert!(reminded.reminder_sent());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scan_without_due_tasks_is_empty(harness: Harness) {
    let summary = harness
        .scanner
        .scan_once()
        .await
        .expect("scan should succeed");
    assert_eq!(summary.selected, 0);
    assert_eq!(summary.reminded, 0);
    assert!(harness.subscriber.events().is_empty());
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

fn task_due_soon(title: &str) -> Task {
    Task::new(
        NewTask {
            title: title.to_owned(),
            due_date: Some(due_in_hours(3)),
            ..NewTask::default()
        },
        &DefaultClock,
    )
    .expect("task creation should succeed")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn one_failing_task_does_not_abort_the_scan() {
    let vanished = task_due_soon("Vanished before reminding");
    let healthy = task_due_soon("Still present");
    let healthy_id = healthy.id();
    let healthy_for_lookup = healthy.clone();

    let mut mock_repository = MockRepo::new();
    let scan_batch = vec![vanished, healthy];
    mock_repository
        .expect_find_due_for_reminder()
        .returning(move |_| Ok(scan_batch.clone()));
    mock_repository.expect_find_by_id().returning(move |id| {
        if id == healthy_id {
            Ok(Some(healthy_for_lookup.clone()))
        } else {
            Ok(None)
        }
    });
    mock_repository.expect_update().returning(|_| Ok(()));

    let repository = Arc::new(mock_repository);
    let subscriber = CollectingSubscriber::new();
    let mut dispatcher = EventDispatcher::new();
    dispatcher.subscribe(subscriber.clone());
    let service = Arc::new(TaskCommandService::new(
        Arc::clone(&repository),
        Arc::new(InMemoryUserDirectory::new()),
        Arc::new(InMemoryAuditSink::new()),
        Arc::new(dispatcher),
        Arc::new(DefaultClock),
    ));
    let scanner = ReminderScanner::new(
        service,
        repository,
        ReminderConfig::default(),
        Arc::new(DefaultClock),
    );

    let summary = scanner.scan_once().await.expect("scan should succeed");

    assert_eq!(summary.selected, 2);
    assert_eq!(summary.reminded, 1);
    assert_eq!(summary.failed, 1);
}
