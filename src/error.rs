//! Error types for the contact-agenda library.
//!
//! The persistence layer reports failures through [`AgendaError`]; the session
//! layer in [`crate::service`] turns them into `false` / `None` / empty results
//! after logging them.

use thiserror::Error;

/// Errors that can occur in the contact-agenda application.
#[derive(Error, Debug)]
pub enum AgendaError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Connection pool errors
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A user with this email is already registered
    #[error("Email {0} is already registered")]
    DuplicateEmail(String),

    /// User not found
    #[error("User with id {0} does not exist")]
    UserNotFound(i64),

    /// Contact not found
    #[error("Contact with id {0} does not exist")]
    ContactNotFound(i64),

    /// Invalid date format
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// Rejected profile photo
    #[error("Invalid photo: {0}")]
    InvalidPhoto(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV writer errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// General error with context
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Result with AgendaError
pub type Result<T> = std::result::Result<T, AgendaError>;
