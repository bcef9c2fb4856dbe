//! # Playback Error Types
//!
//! Errors raised while resolving and playing media, plus the closed set of
//! [`ErrorKind`]s that end up in front of the user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Classification of every failure the controller can surface.
///
/// Each kind carries a fixed user-facing message; the detailed cause is
/// logged, never displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The stream lookup service was unreachable or answered non-2xx.
    NetworkError,
    /// The stream lookup service answered with malformed JSON.
    ParseError,
    /// No usable stream URL could be extracted.
    NoStreamFound,
    /// The external resolver tool did not finish in time.
    SubprocessTimeout,
    /// The external resolver tool could not be launched.
    SubprocessUnavailable,
    /// The playback engine could not be created.
    EngineInitError,
    /// The playback engine rejected or failed a stream.
    PlaybackEngineError,
}

impl ErrorKind {
    /// Message shown to the user for this kind of failure.
    pub fn user_message(self) -> &'static str {
        match self {
            ErrorKind::NetworkError => "Could not reach the stream lookup service",
            ErrorKind::ParseError => "The stream lookup service sent an unreadable response",
            ErrorKind::NoStreamFound => "No playable stream was found for this item",
            ErrorKind::SubprocessTimeout => "The fallback resolver timed out",
            ErrorKind::SubprocessUnavailable => "The fallback resolver is not available",
            ErrorKind::EngineInitError => "The playback engine could not be started",
            ErrorKind::PlaybackEngineError => "Playback failed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::ParseError => "ParseError",
            ErrorKind::NoStreamFound => "NoStreamFound",
            ErrorKind::SubprocessTimeout => "SubprocessTimeout",
            ErrorKind::SubprocessUnavailable => "SubprocessUnavailable",
            ErrorKind::EngineInitError => "EngineInitError",
            ErrorKind::PlaybackEngineError => "PlaybackEngineError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Resolution Errors
    // ========================================================================
    /// Transport failure or non-2xx status from the lookup service.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON.
    #[error("Failed to parse lookup response: {0}")]
    Parse(String),

    /// Nothing playable could be extracted for the given source.
    #[error("No playable stream found for {0}")]
    NoStreamFound(String),

    /// External resolver tool exceeded its time budget and was killed.
    #[error("Resolver process timed out after {0:?}")]
    SubprocessTimeout(Duration),

    /// External resolver tool could not be launched.
    #[error("Resolver process unavailable: {0}")]
    SubprocessUnavailable(String),

    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// Engine construction failed.
    #[error("Failed to create playback engine: {0}")]
    EngineInit(String),

    /// Engine rejected a command.
    #[error("Playback engine error: {0}")]
    Engine(String),

    // ========================================================================
    // Usage Errors
    // ========================================================================
    /// Media reference failed validation.
    #[error("Invalid media reference: {0}")]
    InvalidReference(String),

    /// Configuration value out of range.
    #[error("Invalid playback configuration: {0}")]
    Config(String),

    /// The controller task has ended; commands can no longer be delivered.
    #[error("Playback controller is shut down")]
    ControllerClosed,

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl PlaybackError {
    /// The user-facing classification, if this error can surface in the
    /// error signal.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            PlaybackError::Network(_) => Some(ErrorKind::NetworkError),
            PlaybackError::Parse(_) => Some(ErrorKind::ParseError),
            PlaybackError::NoStreamFound(_) => Some(ErrorKind::NoStreamFound),
            PlaybackError::SubprocessTimeout(_) => Some(ErrorKind::SubprocessTimeout),
            PlaybackError::SubprocessUnavailable(_) => Some(ErrorKind::SubprocessUnavailable),
            PlaybackError::EngineInit(_) => Some(ErrorKind::EngineInitError),
            PlaybackError::Engine(_) => Some(ErrorKind::PlaybackEngineError),
            PlaybackError::InvalidReference(_)
            | PlaybackError::Config(_)
            | PlaybackError::ControllerClosed
            | PlaybackError::IoError(_) => None,
        }
    }

    /// Returns `true` if this error came from resolving a stream URL.
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::Network(_)
                | PlaybackError::Parse(_)
                | PlaybackError::NoStreamFound(_)
                | PlaybackError::SubprocessTimeout(_)
                | PlaybackError::SubprocessUnavailable(_)
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
