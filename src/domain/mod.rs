//! Domain layer - user records, validation and errors

pub mod error;
pub mod user;

pub use error::DomainError;
pub use user::{NewUser, User, UserChanges, UserId, UserRepository};
