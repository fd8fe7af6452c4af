//! Shared fixtures for notification tests.

use crate::task::domain::{NewTask, Task, TaskPriority, TaskStatus, UserId};
use chrono::{DateTime, Duration, Utc};
use mockable::DefaultClock;
use std::time::Duration as StdDuration;

/// Polls `probe` until it returns true or the deadline passes.
pub async fn wait_until<F>(probe: F)
where
    F: Fn() -> bool,
{
    for _ in 0..200 {
        if probe() {
            return;
        }
        tokio::time::sleep(StdDuration::from_millis(5)).await;
    }
    assert!(probe(), "condition not reached within deadline");
}

/// Builds a task snapshot for notification tests.
#[must_use]
#[expect(clippy::expect_used, reason = "test fixture titles are never empty")]
pub fn task_snapshot(
    title: &str,
    assignee: Option<UserId>,
    due_date: Option<DateTime<Utc>>,
) -> Task {
    Task::new(
        NewTask {
            title: title.to_owned(),
            description: None,
            status: Some(TaskStatus::InProgress),
            priority: Some(TaskPriority::High),
            due_date,
            assignee,
            created_by: None,
        },
        &DefaultClock,
    )
    .expect("task creation should succeed")
}

/// A due date one day out.
#[must_use]
pub fn tomorrow() -> DateTime<Utc> {
    Utc::now() + Duration::hours(24)
}
