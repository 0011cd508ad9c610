use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Failures surfaced by the recorder and the player.
///
/// Every variant returns its owning state machine to idle. None of them is
/// fatal and none is retried automatically.
#[derive(Error, Debug)]
pub enum DiaryError {
    /// The action needs a signed-in user.
    #[error("No authenticated user {location}")]
    Unauthenticated {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The user refused microphone access.
    #[error("Microphone permission denied {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No usable input device, or the platform cannot record.
    #[error("Audio input unavailable: {reason} {location}")]
    DeviceUnavailable {
        /// Description of the device failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The capture finished with zero bytes.
    #[error("No audio captured {location}")]
    EmptyRecording {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Object upload or entry write failed.
    #[error("Failed to persist recording: {source} {location}")]
    PersistenceFailed {
        /// Underlying collaborator error.
        #[source]
        source: BackendError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Locator resolution or audio start failed.
    #[error("Playback failed: {source} {location}")]
    PlaybackFailed {
        /// Underlying collaborator error.
        #[source]
        source: BackendError,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl DiaryError {
    /// One line of text the view can show as-is.
    pub fn user_message(&self) -> &'static str {
        match self {
            DiaryError::Unauthenticated { .. } => "Sign in to create a star.",
            DiaryError::PermissionDenied { .. } => {
                "Microphone permission was denied. Allow microphone access and try again."
            }
            DiaryError::DeviceUnavailable { .. } => {
                "Something went wrong while accessing the microphone. Please try again."
            }
            DiaryError::EmptyRecording { .. } => "Please talk a little longer.",
            DiaryError::PersistenceFailed { .. } => "Couldn't save the star. Please try again.",
            DiaryError::PlaybackFailed { .. } => {
                "Couldn't play this star's voice. Please try again in a moment."
            }
        }
    }
}

/// Error payload returned by an external collaborator.
///
/// `code` is machine readable (for example `auth/weak-password` or
/// `storage/object-not-found`); `message` is free text for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct BackendError {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable detail.
    pub message: String,
}

impl BackendError {
    /// Build an error from a code and a message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Failures reported when acquiring or driving an input device.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// Access to the microphone was refused.
    #[error("Microphone access refused: {reason} {location}")]
    PermissionDenied {
        /// Description reported by the platform.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Any other device failure.
    #[error("Audio input unavailable: {reason} {location}")]
    Unavailable {
        /// Description of the device failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

// Manual From with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<CaptureError> for DiaryError {
    #[track_caller]
    fn from(source: CaptureError) -> Self {
        let location = ErrorLocation::from(Location::caller());
        match source {
            CaptureError::PermissionDenied { .. } => DiaryError::PermissionDenied { location },
            CaptureError::Unavailable { reason, .. } => {
                DiaryError::DeviceUnavailable { reason, location }
            }
        }
    }
}

/// Errors from the cpal-backed audio adapters.
#[derive(Error, Debug)]
pub enum AudioError {
    /// No input or output device found.
    #[error("No {direction} device found {location}")]
    NoDeviceFound {
        /// "input" or "output".
        direction: &'static str,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// WAV encoding or decoding failed.
    #[error("WAV codec error: {reason} {location}")]
    CodecError {
        /// Description of the codec error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<AudioError> for BackendError {
    fn from(source: AudioError) -> Self {
        let code = match source {
            AudioError::NoDeviceFound { .. } => "audio/no-device",
            AudioError::DeviceError { .. } => "audio/device-error",
            AudioError::ResamplingError { .. } => "audio/resampling-failed",
            AudioError::CodecError { .. } => "audio/decode-failed",
        };
        BackendError::new(code, source.to_string())
    }
}

impl From<AudioError> for CaptureError {
    #[track_caller]
    fn from(source: AudioError) -> Self {
        CaptureError::Unavailable {
            reason: source.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`DiaryError`].
pub type Result<T> = std::result::Result<T, DiaryError>;
