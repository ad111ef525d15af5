//! User entity and related types

use chrono::NaiveDate;
use super::identifier::UserId;
use super::validation::{parse_birth_date, validate_name, validate_surname, UserValidationError};

/// Persisted user record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    name: String,
    surname: String,
    birth_date: Option<NaiveDate>,
}

impl User {
    /// Rebuild a user that already has a store-assigned id
    pub fn new(
        id: UserId,
        name: impl Into<String>,
        surname: impl Into<String>,
        birth_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            surname: surname.into(),
            birth_date,
        }
    }

    /// Attach a store-assigned id to validated input
    pub fn from_new(id: UserId, new_user: NewUser) -> Self {
        Self {
            id,
            name: new_user.name,
            surname: new_user.surname,
            birth_date: new_user.birth_date,
        }
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }

    /// Overwrite the fields present in `changes`, keep the rest
    pub fn apply(&mut self, changes: UserChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }

        if let Some(surname) = changes.surname {
            self.surname = surname;
        }

        if let Some(birth_date) = changes.birth_date {
            self.birth_date = Some(birth_date);
        }
    }

    /// Field values without the id; equal keys mean duplicate records
    pub fn value_key(&self) -> (&str, &str, Option<NaiveDate>) {
        (&self.name, &self.surname, self.birth_date)
    }
}

/// Validated input for a user that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    name: String,
    surname: String,
    birth_date: Option<NaiveDate>,
}

impl NewUser {
    /// Validate raw creation input
    ///
    /// Fields are checked in order (name, surname, birth date) and the first
    /// failure wins.
    pub fn validate(
        name: Option<&str>,
        surname: Option<&str>,
        birth_date: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        let name = validate_name(name)?;
        let surname = validate_surname(surname)?;
        let birth_date = birth_date.map(parse_birth_date).transpose()?;

        Ok(Self {
            name,
            surname,
            birth_date,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn surname(&self) -> &str {
        &self.surname
    }

    pub fn birth_date(&self) -> Option<NaiveDate> {
        self.birth_date
    }
}

/// Validated field-level changes; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserChanges {
    name: Option<String>,
    surname: Option<String>,
    birth_date: Option<NaiveDate>,
}

impl UserChanges {
    /// Validate each present field with the creation rules
    pub fn validate(
        name: Option<&str>,
        surname: Option<&str>,
        birth_date: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        let name = name.map(|n| validate_name(Some(n))).transpose()?;
        let surname = surname.map(|s| validate_surname(Some(s))).transpose()?;
        let birth_date = birth_date.map(parse_birth_date).transpose()?;

        Ok(Self {
            name,
            surname,
            birth_date,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.surname.is_none() && self.birth_date.is_none()
    }
}
