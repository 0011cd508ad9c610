use star_diary_core::{BackendError, DiaryError, auth_error_message};

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the star-diary binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Recorder or player failure from star-diary-core.
    #[error("Diary error: {source} {location}")]
    Diary {
        /// The underlying diary error.
        #[source]
        source: DiaryError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Authentication or storage backend failure.
    #[error("Backend error: {source} {location}")]
    Backend {
        /// The underlying backend error.
        #[source]
        source: BackendError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A command line could not be understood.
    #[error("Invalid command: {reason} {location}")]
    InvalidCommand {
        /// What was wrong with the input.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send message through async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

impl AppError {
    /// One line suitable for the terminal.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Diary { source, .. } => source.user_message().to_string(),
            AppError::Backend { source, .. } => auth_error_message(source),
            AppError::InvalidCommand { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

// Manual From impls with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<DiaryError> for AppError {
    #[track_caller]
    fn from(source: DiaryError) -> Self {
        AppError::Diary {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<BackendError> for AppError {
    #[track_caller]
    fn from(source: BackendError) -> Self {
        AppError::Backend {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
