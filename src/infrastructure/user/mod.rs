//! User infrastructure module
//!
//! Store implementations for user records (PostgreSQL and in-memory) and the
//! service that validates requests and drives the store.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
pub use service::{SaveUserRequest, UserService};
