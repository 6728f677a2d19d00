//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

#[cfg(test)]
use mockall::automock;

use super::entity::{NewUser, User, UserChanges, UserId, UserRole};
use super::stats::UserStats;
use crate::domain::page::{Page, PageRequest};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Implementations own the uniqueness and existence invariants: `create` and
/// `update` must reject a duplicate email atomically with the write, returning
/// `DomainError::Conflict` on the `email` field. `update` writes only the
/// supplied fields, in the same atomic step.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Store a new user, assigning a fresh identifier
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// Apply a partial update to an existing user
    async fn update(&self, id: UserId, changes: &UserChanges) -> Result<User, DomainError>;

    /// Delete a user, returning whether it existed
    async fn delete(&self, id: UserId) -> Result<bool, DomainError>;

    /// List users ordered by ID
    async fn page(&self, request: PageRequest) -> Result<Page<User>, DomainError>;

    /// Count users (optionally filtered by role)
    async fn count(&self, role: Option<UserRole>) -> Result<usize, DomainError>;

    /// Role totals and the `recent_limit` newest users, read from one snapshot
    async fn stats(&self, recent_limit: usize) -> Result<UserStats, DomainError>;

    /// Whether the store is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        self.count(None).await.map(|_| ())
    }
}
