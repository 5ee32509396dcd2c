//! Result and error types for the core library

use thiserror::Error;

/// Message shared by every failed login, whether the email was unknown or
/// the password was wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("User already exists")]
    Conflict,

    #[error("{INVALID_CREDENTIALS_MESSAGE}")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Errors caused by the caller's input rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Conflict
                | Self::InvalidCredentials
                | Self::InvalidToken
                | Self::NotFound(_)
                | Self::Validation(_)
        )
    }
}

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        assert_eq!(Error::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_client_errors() {
        assert!(Error::Conflict.is_client_error());
        assert!(Error::not_found("gone").is_client_error());
        assert!(!Error::database("boom").is_client_error());
        assert!(!Error::Hashing("bad params".to_string()).is_client_error());
    }

    #[test]
    fn test_validation_message() {
        let err = Error::validation("name must be 2-255 characters");
        assert!(err.to_string().contains("Validation error"));
    }
}
