//! User service for record management

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::domain::error::INTERNAL_ERROR_CODE;
use crate::domain::user::{NewUser, User, UserChanges, UserId, UserRepository};
use crate::domain::DomainError;

/// Raw user fields as received from a client
///
/// Nothing is validated yet; the service turns this into a [`NewUser`] or a
/// [`UserChanges`] depending on the operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveUserRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birth_date: Option<String>,
}

impl SaveUserRequest {
    fn to_new_user(&self) -> Result<NewUser, DomainError> {
        NewUser::validate(
            self.name.as_deref(),
            self.surname.as_deref(),
            self.birth_date.as_deref(),
        )
        .map_err(DomainError::from)
    }

    fn to_changes(&self) -> Result<UserChanges, DomainError> {
        UserChanges::validate(
            self.name.as_deref(),
            self.surname.as_deref(),
            self.birth_date.as_deref(),
        )
        .map_err(DomainError::from)
    }
}

/// User service orchestrating validation and storage
#[derive(Debug)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a new user
    ///
    /// Store failures of any kind are reported as a generic internal error.
    pub async fn create(&self, request: SaveUserRequest) -> Result<User, DomainError> {
        let new_user = request.to_new_user()?;

        let user = self.repository.create(new_user).await.map_err(|e| {
            error!(error = %e, "Failed to persist new user");
            DomainError::internal("Internal error", INTERNAL_ERROR_CODE)
        })?;

        info!(user_id = %user.id(), "User created");

        Ok(user)
    }

    /// List users, dropping records whose values duplicate an earlier one
    pub async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let users = self.repository.find_all().await?;

        let first_seen: Vec<bool> = {
            let mut seen = HashSet::with_capacity(users.len());
            users.iter().map(|u| seen.insert(u.value_key())).collect()
        };

        Ok(users
            .into_iter()
            .zip(first_seen)
            .filter_map(|(user, first)| first.then_some(user))
            .collect())
    }

    /// Get a user by id
    pub async fn find_one_by_id(&self, id: UserId) -> Result<User, DomainError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(DomainError::user_not_found)
    }

    /// Overwrite the fields present in the request
    ///
    /// Serves both full and partial updates: omitted fields keep their stored
    /// values. The request is validated before the user is looked up.
    pub async fn alter_by_id(
        &self,
        id: UserId,
        request: SaveUserRequest,
    ) -> Result<User, DomainError> {
        let changes = request.to_changes()?;
        let mut user = self.find_one_by_id(id).await?;

        if changes.is_empty() {
            debug!(user_id = %id, "Update carried no fields");
        }

        user.apply(changes);

        let user = self.repository.update(&user).await?;
        info!(user_id = %id, "User updated");

        Ok(user)
    }

    /// Update individually supplied fields
    pub async fn alter_fields_by_id(
        &self,
        id: UserId,
        name: Option<String>,
        surname: Option<String>,
        birth_date: Option<String>,
    ) -> Result<User, DomainError> {
        let request = SaveUserRequest {
            name,
            surname,
            birth_date,
        };

        self.alter_by_id(id, request).await
    }

    /// Delete a user
    pub async fn delete_by_id(&self, id: UserId) -> Result<(), DomainError> {
        let user = self.find_one_by_id(id).await?;

        if !self.repository.delete(user.id()).await? {
            debug!(user_id = %id, "User was already gone at delete time");
        }

        info!(user_id = %id, "User deleted");

        Ok(())
    }

    /// Count stored users
    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}
