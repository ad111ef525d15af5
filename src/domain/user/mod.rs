//! User domain
//!
//! Domain types for user records: the entity, its numeric identifier,
//! field validation and the repository trait implemented by the stores.

mod entity;
mod identifier;
mod repository;
mod validation;

pub use entity::{NewUser, User, UserChanges};
pub use identifier::UserId;
pub use repository::UserRepository;
pub use validation::{parse_birth_date, validate_name, validate_surname, UserValidationError};

#[cfg(test)]
pub use repository::MockUserRepository;
