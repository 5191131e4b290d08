//! Sync error types

use std::error::Error as _;
use std::fmt;

use thiserror::Error;

/// Result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

/// A guard that refused to let a sync step run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// No API key was found
    MissingKey,
    /// The key has not been validated, or was rejected
    InvalidKey,
    /// The host is still accepting syntax registrations
    AcceptingRegistrations,
    /// The addon is not registered with the host
    UnregisteredAddon,
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            Precondition::MissingKey => "no API key is present",
            Precondition::InvalidKey => "the API key is not valid",
            Precondition::AcceptingRegistrations => {
                "the host is still accepting syntax registrations"
            }
            Precondition::UnregisteredAddon => "the addon is not registered with the host",
        };
        f.write_str(message)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("cannot sync: {0}")]
    Precondition(Precondition),

    #[error("connection failed: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    #[error("unexpected response from the docs service: {0}")]
    Protocol(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid API endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("a sync pass is already running")]
    Busy,
}

impl SyncError {
    /// Returns true for failures to reach the service at all
    pub fn is_network(&self) -> bool {
        matches!(self, SyncError::Network(_))
    }

    /// The precondition that failed, if any
    pub fn precondition(&self) -> Option<Precondition> {
        match self {
            SyncError::Precondition(p) => Some(*p),
            _ => None,
        }
    }
}

/// Connect and timeout failures become [`SyncError::Network`], carrying the
/// whole cause chain; everything else stays [`SyncError::Http`].
impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        if !(err.is_connect() || err.is_timeout()) {
            return SyncError::Http(err);
        }

        let mut message = err.to_string();
        let mut cause = err.source();
        while let Some(inner) = cause {
            message.push_str(": ");
            message.push_str(&inner.to_string());
            cause = inner.source();
        }
        SyncError::Network(message)
    }
}

impl From<Precondition> for SyncError {
    fn from(precondition: Precondition) -> Self {
        SyncError::Precondition(precondition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert!(SyncError::Network("dns".to_string()).is_network());
        assert!(!SyncError::Protocol("bad".to_string()).is_network());
        assert!(!SyncError::Busy.is_network());

        let err = SyncError::from(Precondition::InvalidKey);
        assert_eq!(err.precondition(), Some(Precondition::InvalidKey));
        assert_eq!(err.to_string(), "cannot sync: the API key is not valid");
    }
}
