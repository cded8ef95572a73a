//! Error types for the Vocal scheduling pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire scheduling pipeline.
///
/// The first four variants form the recoverable turn-level taxonomy: the
/// orchestrator converts each of them into a user-facing prompt instead of
/// letting them propagate upward as raw failures.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum VocalError {
    /// The external parsing capability was unreachable or returned
    /// malformed output. The current draft must not be mutated.
    #[error("Parsing capability unavailable: {message}")]
    ParseUnavailable { message: String },

    /// The calendar automation capability failed transiently
    /// (navigation error, timeout, automation hiccup).
    #[error("Calendar capability unavailable: {message}")]
    CalendarUnavailable { message: String },

    /// The calendar capability has no active login. Not transient until
    /// the user completes login out of band.
    #[error("Not logged in to the calendar")]
    NotLoggedIn,

    /// Input that cannot affect the current dialogue (e.g. advancing a
    /// finished session).
    #[error("Invalid turn: {0}")]
    InvalidTurn(String),

    /// No session registered under the given id.
    #[error("Session not found: '{id}'")]
    SessionNotFound { id: String },

    /// A turn for this session is already in flight; the caller must
    /// retry after it completes.
    #[error("Session '{id}' already has a turn in flight")]
    SessionBusy { id: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VocalError {
    /// Creates a ParseUnavailable error
    pub fn parse_unavailable(message: impl Into<String>) -> Self {
        Self::ParseUnavailable {
            message: message.into(),
        }
    }

    /// Creates a CalendarUnavailable error
    pub fn calendar_unavailable(message: impl Into<String>) -> Self {
        Self::CalendarUnavailable {
            message: message.into(),
        }
    }

    /// Creates an InvalidTurn error
    pub fn invalid_turn(message: impl Into<String>) -> Self {
        Self::InvalidTurn(message.into())
    }

    /// Creates a SessionNotFound error
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    /// Creates a SessionBusy error
    pub fn session_busy(id: impl Into<String>) -> Self {
        Self::SessionBusy { id: id.into() }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a ParseUnavailable error
    pub fn is_parse_unavailable(&self) -> bool {
        matches!(self, Self::ParseUnavailable { .. })
    }

    /// Check if this is a NotLoggedIn error
    pub fn is_not_logged_in(&self) -> bool {
        matches!(self, Self::NotLoggedIn)
    }

    /// Check if this error is recoverable at the orchestrator boundary,
    /// i.e. part of the turn-level taxonomy that becomes a user prompt.
    pub fn is_turn_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ParseUnavailable { .. }
                | Self::CalendarUnavailable { .. }
                | Self::NotLoggedIn
                | Self::InvalidTurn(_)
        )
    }
}

impl From<std::io::Error> for VocalError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for VocalError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for VocalError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, VocalError>`.
pub type Result<T> = std::result::Result<T, VocalError>;
