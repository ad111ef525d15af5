//! User identifier and path sanitizing

use crate::domain::DomainError;

/// Numeric user identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Build an id from a raw path segment
    ///
    /// Every non-digit character is dropped before parsing, so `"abc123xyz"`
    /// becomes `123`. Fails when nothing numeric remains or the digits do not
    /// fit in an `i64`.
    pub fn sanitize(raw: &str) -> Result<Self, DomainError> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();

        if digits.is_empty() {
            return Err(DomainError::invalid_identifier(format!(
                "'{}' contains no digits",
                raw
            )));
        }

        digits.parse::<i64>().map(Self).map_err(|_| {
            DomainError::invalid_identifier(format!("'{}' is out of range", raw))
        })
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
