//! In-memory user repository implementation

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::{NewUser, User, UserId, UserRepository};
use crate::domain::DomainError;

#[derive(Debug)]
struct Table {
    rows: BTreeMap<UserId, User>,
    next_id: i64,
}

/// In-memory implementation of UserRepository
///
/// Ids are handed out from a counter starting at 1 and never reused, which
/// mirrors a database sequence.
#[derive(Debug, Clone)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
            })),
        }
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let rows: BTreeMap<UserId, User> = users.into_iter().map(|u| (u.id(), u)).collect();
        let next_id = rows.keys().last().map_or(1, |id| id.value().saturating_add(1));

        Self {
            table: Arc::new(RwLock::new(Table { rows, next_id })),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        let id = UserId::new(table.next_id);
        table.next_id = table
            .next_id
            .checked_add(1)
            .ok_or_else(|| DomainError::storage("User id sequence exhausted"))?;

        let user = User::from_new(id, user);
        table.rows.insert(id, user.clone());

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.values().cloned().collect())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn update(&self, user: &User) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        match table.rows.get_mut(&user.id()) {
            Some(row) => {
                *row = user.clone();
                Ok(user.clone())
            }
            None => Err(DomainError::user_not_found()),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, DomainError> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&id).is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        let table = self.table.read().await;
        Ok(table.rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_user(name: &str, surname: &str) -> NewUser {
        NewUser::validate(Some(name), Some(surname), Some("1999-11-30")).unwrap()
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let repo = InMemoryUserRepository::new();

        let first = repo.create(new_user("van-romel", "neto")).await.unwrap();
        let second = repo.create(new_user("João", "Carreira")).await.unwrap();

        assert_eq!(first.id().value(), 1);
        assert_eq!(second.id().value(), 2);
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("van-romel", "neto")).await.unwrap();

        let retrieved = repo.find_by_id(user.id()).await.unwrap();
        assert_eq!(retrieved, Some(user));

        let missing = repo.find_by_id(UserId::new(99)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("a", "b")).await.unwrap();

        assert!(repo.delete(user.id()).await.unwrap());

        let next = repo.create(new_user("c", "d")).await.unwrap();
        assert_eq!(next.id().value(), 2);
    }

    #[tokio::test]
    async fn test_find_all_is_ordered_by_id() {
        let repo = InMemoryUserRepository::new();

        for i in 0..5 {
            repo.create(new_user(&format!("name{i}"), "x")).await.unwrap();
        }

        let ids: Vec<i64> = repo
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|u| u.id().value())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_update() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("van-romel", "neto")).await.unwrap();

        let changed = User::new(user.id(), "van-romel", "filho", user.birth_date());
        repo.update(&changed).await.unwrap();

        let retrieved = repo.find_by_id(user.id()).await.unwrap().unwrap();
        assert_eq!(retrieved.surname(), "filho");
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let repo = InMemoryUserRepository::new();
        let ghost = User::new(UserId::new(3), "a", "b", None);

        let err = repo.update(&ghost).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(err.code(), 2001);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = InMemoryUserRepository::new();
        let user = repo.create(new_user("van-romel", "neto")).await.unwrap();

        assert!(repo.delete(user.id()).await.unwrap());
        assert!(!repo.delete(user.id()).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_with_users() {
        let date = NaiveDate::from_ymd_opt(1999, 12, 30);
        let repo = InMemoryUserRepository::with_users(vec![
            User::new(UserId::new(4), "van-gasfasf", "afasdas", date),
            User::new(UserId::new(9), "van-romel", "neto", None),
        ]);

        assert_eq!(repo.count().await.unwrap(), 2);

        let next = repo.create(new_user("x", "y")).await.unwrap();
        assert_eq!(next.id().value(), 10);
    }
}
