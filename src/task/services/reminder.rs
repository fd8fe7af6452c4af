//! Periodic scan for tasks approaching their due date.

use crate::audit::ports::AuditSink;
use super::commands::{TaskCommandError, TaskCommandService};
use crate::task::{
    domain::Task,
    ports::{TaskRepository, TaskRepositoryError, UserDirectory},
};
use chrono::Duration as ChronoDuration;
use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

/// Reminder scheduling configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderConfig {
    /// How far before the due date a reminder fires.
    pub lead_time: ChronoDuration,
    /// Pause between scans.
    pub interval: Duration,
}

impl ReminderConfig {
    /// Creates a configuration with a lead time in hours.
    #[must_use]
    pub fn new(lead_hours: i64, interval: Duration) -> Self {
        Self {
            lead_time: ChronoDuration::hours(lead_hours),
            interval,
        }
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self::new(24, Duration::from_secs(3600))
    }
}

/// Outcome of one reminder scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Tasks matching the reminder criteria.
    pub selected: usize,
    /// Tasks whose reminder was raised and flagged.
    pub reminded: usize,
    /// Tasks whose reminder failed; they stay eligible for the next scan.
    pub failed: usize,
}

/// Periodic job raising `Reminder` events for due tasks.
///
/// Each matching task goes through the command service: the reminder event
/// first, then `mark_reminder_sent` as a separate update, so a crash in
/// between yields at most one duplicate reminder on the next run. One
/// task's failure never aborts the rest of the scan.
pub struct ReminderScanner<R, U, S, C>
where
    R: TaskRepository,
    U: UserDirectory,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    commands: Arc<TaskCommandService<R, U, S, C>>,
    repository: Arc<R>,
    config: ReminderConfig,
    clock: Arc<C>,
}

impl<R, U, S, C> ReminderScanner<R, U, S, C>
where
    R: TaskRepository,
    U: UserDirectory,
    S: AuditSink + 'static,
    C: Clock + Send + Sync,
{
    /// Creates a scanner over the given command service and repository.
    #[must_use]
    pub const fn new(
        commands: Arc<TaskCommandService<R, U, S, C>>,
        repository: Arc<R>,
        config: ReminderConfig,
        clock: Arc<C>,
    ) -> Self {
        Self {
            commands,
            repository,
            config,
            clock,
        }
    }

    /// Runs one scan pass.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError`] when the due-task query itself
    /// fails; per-task reminder failures are logged and counted instead.
    pub async fn scan_once(&self) -> Result<ScanSummary, TaskRepositoryError> {
        let threshold = self.clock.utc() + self.config.lead_time;
        let due = self.repository.find_due_for_reminder(threshold).await?;

        let mut summary = ScanSummary {
            selected: due.len(),
            ..ScanSummary::default()
        };
        for task in due {
            match self.remind(&task).await {
                Ok(()) => summary.reminded += 1,
                Err(err) => {
                    summary.failed += 1;
                    warn!(task_id = %task.id(), error = %err, "failed to send reminder");
                }
            }
        }

        info!(
            selected = summary.selected,
            reminded = summary.reminded,
            failed = summary.failed,
            "reminder scan completed"
        );
        Ok(summary)
    }

    /// Scans on the configured interval until shutdown.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = self.scan_once().await {
                        error!(error = %err, "reminder scan failed");
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        info!("reminder scanner stopped");
    }

    /// Raises the reminder event, then flags the task in a separate
    /// update.
    async fn remind(&self, task: &Task) -> Result<(), TaskCommandError> {
        self.commands.send_reminder(task.id()).await?;
        self.commands.mark_reminder_sent(task.id()).await?;
        Ok(())
    }
}
