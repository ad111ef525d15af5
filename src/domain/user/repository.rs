//! User repository trait

use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use super::entity::{NewUser, User};
use super::identifier::UserId;
use crate::domain::DomainError;

/// Repository trait for user storage
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Store a new user and return it with its assigned id
    async fn create(&self, user: NewUser) -> Result<User, DomainError>;

    /// List all users ordered by id
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    /// Get a user by id
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Overwrite an existing user
    ///
    /// Fails with the user not-found error when no row carries the id.
    async fn update(&self, user: &User) -> Result<User, DomainError>;

    /// Delete a user, returning whether a record was removed
    async fn delete(&self, id: UserId) -> Result<bool, DomainError>;

    /// Count stored users
    async fn count(&self) -> Result<usize, DomainError>;
}
