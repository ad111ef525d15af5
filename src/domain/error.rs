use thiserror::Error;

/// Description used when an error is raised without one
pub const FALLBACK_DESCRIPTION: &str = "Internal Error, please contact the support";

/// Code used when an error is raised with a code outside the internal range
pub const FALLBACK_CODE: i64 = -1;

/// Lowest code accepted as an internal error code
const MIN_INTERNAL_CODE: i64 = 1000;

/// Internal code reported when a store write fails during creation
pub const INTERNAL_ERROR_CODE: i64 = 5010;

/// Internal code reported when a user lookup comes back empty
pub const USER_NOT_FOUND_CODE: i64 = 2001;

/// Internal code reported when a path identifier cannot be sanitized
pub const INVALID_IDENTIFIER_CODE: i64 = 1004;

/// Core domain errors
///
/// Every variant renders to a description plus a numeric internal code at the
/// HTTP boundary. `Storage` carries a diagnostic message that is logged but
/// never shown to clients.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("Bad request ({code}): {description}")]
    BadRequest { description: String, code: i64 },

    #[error("Invalid identifier: {message}")]
    InvalidIdentifier { message: String },

    #[error("Not found ({code}): {description}")]
    NotFound { description: String, code: i64 },

    #[error("Internal error ({code}): {description}")]
    Internal { description: String, code: i64 },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl DomainError {
    pub fn bad_request(description: impl Into<String>, code: i64) -> Self {
        let (description, code) = normalize(description.into(), code);
        Self::BadRequest { description, code }
    }

    pub fn not_found(description: impl Into<String>, code: i64) -> Self {
        let (description, code) = normalize(description.into(), code);
        Self::NotFound { description, code }
    }

    pub fn internal(description: impl Into<String>, code: i64) -> Self {
        let (description, code) = normalize(description.into(), code);
        Self::Internal { description, code }
    }

    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// The referenced user does not exist
    pub fn user_not_found() -> Self {
        Self::not_found("The user was not found", USER_NOT_FOUND_CODE)
    }

    /// Description shown to API clients
    pub fn description(&self) -> &str {
        match self {
            Self::BadRequest { description, .. }
            | Self::NotFound { description, .. }
            | Self::Internal { description, .. } => description,
            Self::InvalidIdentifier { .. } => "Invalid user id.",
            Self::Storage { .. } => FALLBACK_DESCRIPTION,
        }
    }

    /// Numeric internal code shown to API clients
    pub fn code(&self) -> i64 {
        match self {
            Self::BadRequest { code, .. }
            | Self::NotFound { code, .. }
            | Self::Internal { code, .. } => *code,
            Self::InvalidIdentifier { .. } => INVALID_IDENTIFIER_CODE,
            Self::Storage { .. } => FALLBACK_CODE,
        }
    }
}

fn normalize(description: String, code: i64) -> (String, i64) {
    let description = if description.trim().is_empty() {
        FALLBACK_DESCRIPTION.to_string()
    } else {
        description
    };

    let code = if code < MIN_INTERNAL_CODE {
        FALLBACK_CODE
    } else {
        code
    };

    (description, code)
}
