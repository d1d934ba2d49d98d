//! A normalized, validated email address.

use std::fmt::Display;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The longest email address that can be registered.
pub const MAX_EMAIL_LENGTH: usize = 100;

/// An email address that has been trimmed, lowercased and checked for validity.
///
/// Two addresses that differ only in case are considered the same account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Normalize and validate `raw_email`.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] if the email is empty, longer than [MAX_EMAIL_LENGTH]
    /// characters or not a syntactically valid address.
    pub fn new(raw_email: &str) -> Result<Self, Error> {
        let email = raw_email.trim().to_lowercase();

        if email.is_empty() {
            return Err(Error::Validation("email is required".to_owned()));
        }

        if email.chars().count() > MAX_EMAIL_LENGTH {
            return Err(Error::Validation(format!(
                "email must be at most {MAX_EMAIL_LENGTH} characters"
            )));
        }

        if !EmailAddress::is_valid(&email) {
            return Err(Error::Validation(format!(
                "\"{email}\" is not a valid email address"
            )));
        }

        Ok(Self(email))
    }

    /// Create an email without validation.
    ///
    /// The caller should ensure that the string is a lowercase, valid email address.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the invariant
    /// is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(email: &str) -> Self {
        Self(email.to_owned())
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
