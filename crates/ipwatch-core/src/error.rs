//! Error types for the ipwatch system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for ipwatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the ipwatch system
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration setting
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage connection or write failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Every IP provider was tried and none returned a usable address
    #[error("failed to retrieve IP address from any of the following providers: {}", attempted.join(", "))]
    Resolution {
        /// Provider identifiers, in the order they were attempted
        attempted: Vec<String>,
    },

    /// Outbound notification failure (webhook, healthcheck)
    #[error("notification error: {0}")]
    Notification(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a resolution-exhausted error from the attempted provider list
    pub fn resolution(attempted: Vec<String>) -> Self {
        Self::Resolution { attempted }
    }

    /// Create a notification error
    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_error_lists_attempted_providers() {
        let err = Error::resolution(vec![
            "https://one.example".to_string(),
            "https://two.example".to_string(),
        ]);

        let message = err.to_string();
        assert!(message.contains("https://one.example"));
        assert!(message.contains("https://two.example"));
    }
}
