//! Credential storage for the API token
//!
//! The scheduler only needs to know whether a token is present and what it
//! is. Storage is behind the `CredentialStore` trait so the backend can be
//! swapped without touching the poll loop:
//!
//! - `MemoryCredentialStore`: process-local, used by tests
//! - `FileCredentialStore`: a token file in the user's config directory

mod file;

use std::sync::RwLock;

pub use file::FileCredentialStore;

/// Errors that can occur while reading or writing a credential
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The backing storage could not be read or written
    #[error("Credential storage error: {0}")]
    Storage(String),

    /// The token is empty after trimming
    #[error("API token is empty")]
    EmptyToken,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stores a single opaque bearer token
pub trait CredentialStore: Send + Sync {
    /// Current token, if one is stored
    fn get(&self) -> Result<Option<String>, CredentialError>;

    /// Store `token`, replacing any existing one
    fn set(&self, token: &str) -> Result<(), CredentialError>;

    /// Remove the stored token. Removing a missing token is not an error.
    fn remove(&self) -> Result<(), CredentialError>;

    fn has_token(&self) -> bool {
        matches!(self.get(), Ok(Some(_)))
    }
}

/// Normalize a token before storing it
pub(crate) fn clean_token(token: &str) -> Result<&str, CredentialError> {
    let token = token.trim();
    if token.is_empty() {
        Err(CredentialError::EmptyToken)
    } else {
        Ok(token)
    }
}

/// Credential store that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `token`
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<String>, CredentialError> {
        let token = self
            .token
            .read()
            .map_err(|e| CredentialError::Storage(e.to_string()))?;
        Ok(token.clone())
    }

    fn set(&self, token: &str) -> Result<(), CredentialError> {
        let token = clean_token(token)?;
        let mut slot = self
            .token
            .write()
            .map_err(|e| CredentialError::Storage(e.to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), CredentialError> {
        let mut slot = self
            .token
            .write()
            .map_err(|e| CredentialError::Storage(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}
