//! Application state for shared services

use std::sync::Arc;

use crate::domain::{DomainError, User, UserId, UserRepository};
use crate::infrastructure::user::{InMemoryUserRepository, SaveUserRequest, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, request: SaveUserRequest) -> Result<User, DomainError>;
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;
    async fn find_one_by_id(&self, id: UserId) -> Result<User, DomainError>;
    async fn alter_by_id(&self, id: UserId, request: SaveUserRequest)
        -> Result<User, DomainError>;
    async fn alter_fields_by_id(
        &self,
        id: UserId,
        name: Option<String>,
        surname: Option<String>,
        birth_date: Option<String>,
    ) -> Result<User, DomainError>;
    async fn delete_by_id(&self, id: UserId) -> Result<(), DomainError>;
    /// Number of stored users, used by the readiness probe
    async fn count(&self) -> Result<usize, DomainError>;
}

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UserServiceTrait for UserService<R> {
    async fn create(&self, request: SaveUserRequest) -> Result<User, DomainError> {
        UserService::create(self, request).await
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        UserService::find_all(self).await
    }

    async fn find_one_by_id(&self, id: UserId) -> Result<User, DomainError> {
        UserService::find_one_by_id(self, id).await
    }

    async fn alter_by_id(
        &self,
        id: UserId,
        request: SaveUserRequest,
    ) -> Result<User, DomainError> {
        UserService::alter_by_id(self, id, request).await
    }

    async fn alter_fields_by_id(
        &self,
        id: UserId,
        name: Option<String>,
        surname: Option<String>,
        birth_date: Option<String>,
    ) -> Result<User, DomainError> {
        UserService::alter_fields_by_id(self, id, name, surname, birth_date).await
    }

    async fn delete_by_id(&self, id: UserId) -> Result<(), DomainError> {
        UserService::delete_by_id(self, id).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self { user_service }
    }

    /// State backed by an empty in-memory store
    pub fn in_memory() -> Self {
        Self::with_repository(InMemoryUserRepository::new())
    }

    /// State backed by the given store
    pub fn with_repository<R: UserRepository + 'static>(repository: R) -> Self {
        Self::new(Arc::new(UserService::new(Arc::new(repository))))
    }
}
