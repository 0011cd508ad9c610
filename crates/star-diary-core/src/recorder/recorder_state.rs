use crate::CaptureStream;

use std::fmt;

use tokio::{sync::mpsc, time::Instant};
use uuid::Uuid;

/// Recorder lifecycle, one variant per state.
///
/// Only `Recording` owns device resources. Errors are not a resting state:
/// every failure lands back in `Idle`.
pub(crate) enum RecorderState {
    /// Nothing in flight.
    Idle,
    /// Waiting for the user or platform to grant microphone access.
    RequestingPermission,
    /// Capture running, chunks buffering in `chunks`.
    Recording {
        session_id: Uuid,
        started_at: Instant,
        stream: Box<dyn CaptureStream>,
        chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    },
    /// Finalizing the blob and releasing the device.
    Stopping { session_id: Uuid },
    /// Blob handed to an upload job; waiting for its outcome.
    Uploading { session_id: Uuid },
}

impl RecorderState {
    pub(crate) fn phase(&self) -> RecorderPhase {
        match self {
            RecorderState::Idle => RecorderPhase::Idle,
            RecorderState::RequestingPermission => RecorderPhase::RequestingPermission,
            RecorderState::Recording { .. } => RecorderPhase::Recording,
            RecorderState::Stopping { .. } => RecorderPhase::Stopping,
            RecorderState::Uploading { .. } => RecorderPhase::Uploading,
        }
    }
}

impl fmt::Debug for RecorderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderState::Recording { session_id, .. }
            | RecorderState::Stopping { session_id }
            | RecorderState::Uploading { session_id } => f
                .debug_struct("RecorderState")
                .field("phase", &self.phase())
                .field("session_id", session_id)
                .finish(),
            _ => f
                .debug_struct("RecorderState")
                .field("phase", &self.phase())
                .finish(),
        }
    }
}

/// Observable recorder phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderPhase {
    /// Ready for a new recording.
    Idle,
    /// Waiting on device access.
    RequestingPermission,
    /// Capturing audio.
    Recording,
    /// Finalizing the capture.
    Stopping,
    /// Persisting the capture.
    Uploading,
}
