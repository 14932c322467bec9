//! Input validation that reports every problem at once.

use crate::error::{Error, Result};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 3;

/// Collects validation messages.
///
/// Callers check every rule and push a message for each failure, then
/// turn the collection into a single [`Error::Validation`] whose message
/// joins all of them with `", "`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Problems(Vec<String>);

impl Problems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` when `failed` holds.
    pub fn check(&mut self, failed: bool, message: impl Into<String>) -> &mut Self {
        if failed {
            self.0.push(message.into());
        }
        self
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, message: &str) -> bool {
        self.0.iter().any(|m| m == message)
    }

    /// Combined message, or `None` when nothing failed.
    pub fn message(&self) -> Option<String> {
        (!self.0.is_empty()).then(|| self.0.join(", "))
    }

    pub fn into_result(self) -> Result<()> {
        match self.message() {
            Some(message) => Err(Error::Validation(message)),
            None => Ok(()),
        }
    }
}

/// True when a required text field is missing or blank.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// True when a password is shorter than [`MIN_PASSWORD_LEN`] characters.
pub fn password_too_short(password: Option<&str>) -> bool {
    password.is_none_or(|p| p.chars().count() < MIN_PASSWORD_LEN)
}
