//! User field validation
//!
//! Validation runs on raw request values before any entity is built. Each
//! check either returns the accepted value or a [`UserValidationError`]
//! carrying the internal code reported to API clients.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::domain::DomainError;

/// Strict `yyyy-MM-dd` shape, checked before calendar parsing
static BIRTH_DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("birth date pattern is valid"));

const BIRTH_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    #[error("Invalid name.")]
    InvalidName,

    #[error("Invalid surname.")]
    InvalidSurname,

    #[error("Invalid date format. Please use 'yyyy-MM-dd'")]
    InvalidBirthDate,
}

impl UserValidationError {
    /// Internal code reported alongside the description
    pub fn code(&self) -> i64 {
        match self {
            Self::InvalidName => 1001,
            Self::InvalidSurname => 1002,
            Self::InvalidBirthDate => 1003,
        }
    }
}

impl From<UserValidationError> for DomainError {
    fn from(err: UserValidationError) -> Self {
        DomainError::bad_request(err.to_string(), err.code())
    }
}

/// Validate a name; missing and blank values are rejected
pub fn validate_name(name: Option<&str>) -> Result<String, UserValidationError> {
    match name {
        Some(value) if !is_blank(value) => Ok(value.to_string()),
        _ => Err(UserValidationError::InvalidName),
    }
}

/// Validate a surname; missing and blank values are rejected alike
pub fn validate_surname(surname: Option<&str>) -> Result<String, UserValidationError> {
    match surname {
        Some(value) if !is_blank(value) => Ok(value.to_string()),
        _ => Err(UserValidationError::InvalidSurname),
    }
}

/// Parse an ISO `yyyy-MM-dd` birth date
pub fn parse_birth_date(value: &str) -> Result<NaiveDate, UserValidationError> {
    if !BIRTH_DATE_PATTERN.is_match(value) {
        return Err(UserValidationError::InvalidBirthDate);
    }

    NaiveDate::parse_from_str(value, BIRTH_DATE_FORMAT)
        .map_err(|_| UserValidationError::InvalidBirthDate)
}

/// Any Unicode whitespace counts, including no-break spaces
fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
