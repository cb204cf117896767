//! Fetch failures and how the poll loop reacts to them

use serde::{Deserialize, Serialize};

use crate::reload_policy::ReloadPolicy;

/// Errors that can occur while talking to the review service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid API token")]
    Unauthorized,

    #[error("Not connected to the internet")]
    NotConnected,

    #[error("Couldn't parse the response from the server: {0}")]
    Malformed(String),

    #[error("The server returned an error response ({code}): {message}")]
    ServerError { code: i64, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

/// Tag published in the error state, without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Unauthorized,
    NotConnected,
    Malformed,
    ServerError,
    Network,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Unauthorized => FetchErrorKind::Unauthorized,
            FetchError::NotConnected => FetchErrorKind::NotConnected,
            FetchError::Malformed(_) => FetchErrorKind::Malformed,
            FetchError::ServerError { .. } => FetchErrorKind::ServerError,
            FetchError::Network(_) => FetchErrorKind::Network,
        }
    }

    /// Bad credentials and a missing network path wait for an external
    /// trigger; everything else retries after the fallback delay.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Unauthorized => false,
            FetchError::NotConnected => false,
            FetchError::Malformed(_) => true,
            FetchError::ServerError { .. } => true,
            FetchError::Network(_) => true,
        }
    }

    /// Policy forced on the poll loop after this failure
    pub fn reload_policy(&self) -> ReloadPolicy {
        if self.is_retryable() {
            ReloadPolicy::Fallback
        } else {
            ReloadPolicy::None
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            FetchError::NotConnected
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            FetchErrorKind::Unauthorized => "invalid API token",
            FetchErrorKind::NotConnected => "not connected",
            FetchErrorKind::Malformed => "unexpected response",
            FetchErrorKind::ServerError => "server error",
            FetchErrorKind::Network => "network error",
        };
        write!(f, "{}", text)
    }
}
