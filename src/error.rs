//! # Recommendation Errors
//!
//! Failures of the recommendation round trip are classified into exactly three
//! kinds so the chat front-end can decide what to show:
//!
//! - `invalid_credential` - the API key is missing or was rejected; the user
//!   is asked to enter a new one
//! - `empty_response` - the service answered, but with nothing usable (no
//!   text, unparsable JSON, or a payload that fails validation)
//! - `network_or_service_error` - transport failure, timeout, or any other
//!   non-success reply
//!
//! Everything outside the round trip (database, configuration, terminal I/O)
//! uses `anyhow::Result` like the rest of the crate.

use std::fmt;
use thiserror::Error;

/// Classified failure of a single recommendation request.
#[derive(Debug, Error)]
pub enum RecommendError {
    /// Missing, blank, or rejected API key.
    #[error("The provided API key is not valid. Please check it in the settings.")]
    InvalidCredential,

    /// The service replied without a usable payload.
    #[error("Received an empty or unreadable response from the AI: {0}")]
    EmptyResponse(String),

    /// Network failure or a non-success reply from the service.
    #[error("Failed to get a response from the AI. Please check your API key and network connection. ({0})")]
    Service(String),
}

/// Stable, machine-readable error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidCredential,
    EmptyResponse,
    NetworkOrServiceError,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "invalid_credential",
            Self::EmptyResponse => "empty_response",
            Self::NetworkOrServiceError => "network_or_service_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RecommendError {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredential => ErrorKind::InvalidCredential,
            Self::EmptyResponse(_) => ErrorKind::EmptyResponse,
            Self::Service(_) => ErrorKind::NetworkOrServiceError,
        }
    }

    /// True when the user has to re-enter the API key.
    #[must_use]
    pub const fn needs_credential(&self) -> bool {
        matches!(self, Self::InvalidCredential)
    }
}

impl From<reqwest::Error> for RecommendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Service("request timed out".to_string())
        } else {
            Self::Service(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_strings() {
        assert_eq!(RecommendError::InvalidCredential.kind().as_str(), "invalid_credential");
        assert_eq!(
            RecommendError::EmptyResponse("no text".into()).kind().as_str(),
            "empty_response"
        );
        assert_eq!(
            RecommendError::Service("HTTP 500".into()).kind().to_string(),
            "network_or_service_error"
        );
    }

    #[test]
    fn test_only_invalid_credential_needs_credential() {
        assert!(RecommendError::InvalidCredential.needs_credential());
        assert!(!RecommendError::EmptyResponse(String::new()).needs_credential());
        assert!(!RecommendError::Service(String::new()).needs_credential());
    }

    #[test]
    fn test_messages_are_user_facing() {
        let message = RecommendError::InvalidCredential.to_string();
        assert!(message.contains("API key is not valid"));

        let message = RecommendError::Service("HTTP 503".into()).to_string();
        assert!(message.contains("HTTP 503"));
    }
}
