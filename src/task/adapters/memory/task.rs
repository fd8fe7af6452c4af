//! In-memory repository for task pipeline tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` when no tasks are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_error(message: &str) -> TaskRepositoryError {
        TaskRepositoryError::persistence(std::io::Error::other(message.to_owned()))
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut guard = self
            .tasks
            .write()
            .map_err(|_| Self::lock_error("task store lock poisoned"))?;
        if guard.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        guard.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut guard = self
            .tasks
            .write()
            .map_err(|_| Self::lock_error("task store lock poisoned"))?;
        if !guard.contains_key(&task.id()) {
            return Err(TaskRepositoryError::NotFound(task.id()));
        }
        guard.insert(task.id(), task.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let guard = self
            .tasks
            .read()
            .map_err(|_| Self::lock_error("task store lock poisoned"))?;
        Ok(guard.get(&id).cloned())
    }

    async fn find_due_for_reminder(
        &self,
        threshold: DateTime<Utc>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let guard = self
            .tasks
            .read()
            .map_err(|_| Self::lock_error("task store lock poisoned"))?;
        let mut due: Vec<Task> = guard
            .values()
            .filter(|task| {
                task.due_date().is_some_and(|date| date <= threshold)
                    && !task.reminder_sent()
                    && !task.status().is_terminal()
            })
            .cloned()
            .collect();
        due.sort_by_key(Task::due_date);
        Ok(due)
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut guard = self
            .tasks
            .write()
            .map_err(|_| Self::lock_error("task store lock poisoned"))?;
        guard
            .remove(&id)
            .map(|_| ())
            .ok_or(TaskRepositoryError::NotFound(id))
    }
}
