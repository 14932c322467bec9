//! Error types for the bloglist core.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating input or parsing identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// One or more input fields failed validation.
    ///
    /// The message holds every problem found, joined with `", "`.
    #[error("{0}")]
    Validation(String),

    /// A string could not be parsed as an [`ObjectId`](crate::ObjectId).
    #[error("malformatted id: {0}")]
    MalformedId(String),
}
