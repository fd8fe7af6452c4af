//! In-memory user directory for task pipeline tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{User, UserId},
    ports::{UserDirectory, UserDirectoryError, UserDirectoryResult},
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user, replacing any existing entry with the same identifier.
    pub fn insert(&self, user: User) {
        if let Ok(mut guard) = self.users.write() {
            guard.insert(user.id(), user);
        }
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> UserDirectoryResult<Option<User>> {
        let guard = self
            .users
            .read()
            .map_err(|e| UserDirectoryError::lookup(std::io::Error::other(e.to_string())))?;
        Ok(guard.get(&id).cloned())
    }
}
