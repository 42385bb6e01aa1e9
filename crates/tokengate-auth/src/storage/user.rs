//! User storage trait.
//!
//! The token core only needs one capability from a user store: resolving a
//! login credential pair to a subject. Production backends implement
//! [`UserStorage`]; [`InMemoryUserStorage`] serves tests and seeded setups.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthResult;
use crate::types::Subject;

/// A user that can log in.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    /// Identifier embedded in issued tokens.
    pub id: Subject,

    /// Login email address.
    pub email: String,

    /// Login password.
    pub password: String,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl User {
    /// Creates a user.
    #[must_use]
    pub fn new(id: impl Into<Subject>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Credential lookup.
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Finds the user whose email and password both match.
    ///
    /// Returns `None` if no user matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    async fn find_by_credentials(&self, email: &str, password: &str) -> AuthResult<Option<User>>;
}

/// Fixed list of users held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStorage {
    users: Vec<User>,
}

impl InMemoryUserStorage {
    /// Creates a store holding `users`.
    #[must_use]
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserStorage for InMemoryUserStorage {
    async fn find_by_credentials(&self, email: &str, password: &str) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .cloned())
    }
}
