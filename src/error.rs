//! Error types for reviewcount
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

use crate::api::FetchError;
use crate::credentials::CredentialError;

/// All error types that can occur in reviewcount
#[derive(Debug, Error)]
pub enum ReviewCountError {
    /// Talking to the review service failed
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Reading or writing the API token failed
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Invalid state transition or operation
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

/// Result type alias for reviewcount operations
pub type Result<T> = std::result::Result<T, ReviewCountError>;
