//! Read-only user profile data resolved from the external directory.

use super::UserId;
use serde::{Deserialize, Serialize};

/// Snapshot of a directory user.
///
/// The pipeline reads a user's notification address and display name; it
/// never creates or mutates users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    first_name: Option<String>,
}

impl User {
    /// Creates a user snapshot with the required directory fields.
    #[must_use]
    pub fn new(id: UserId, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: email.into(),
            first_name: None,
        }
    }

    /// Sets the user's first name.
    #[must_use]
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the login name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the notification address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the name used to greet the user, preferring the first name
    /// and falling back to the username.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or(&self.username)
    }
}
