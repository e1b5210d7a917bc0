//! Error types for storage provider operations

use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while talking to a storage provider
#[derive(Error, Debug)]
pub enum StorageError {
    /// The provider answered with an error status
    #[error("Provider rejected request ({status}): {message}")]
    Rejected {
        /// HTTP status returned by the provider
        status: u16,
        /// Error message extracted from the provider response
        message: String,
    },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Credentials could not be used to authenticate or sign
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The provider answered successfully with a body we cannot use
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),

    /// Provider settings cannot be used to build requests
    #[error("Configuration error: {0}")]
    Config(String),

    /// The object does not exist
    #[error("Object not found: {0}")]
    NotFound(String),
}

impl From<jsonwebtoken::errors::Error> for StorageError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        Self::Auth(error.to_string())
    }
}
