use crate::BackendError;

use async_trait::async_trait;
use tokio::sync::oneshot;

/// Factory for playback handles.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Prepare the audio at `url` for playback.
    async fn load(&self, url: &str) -> Result<Box<dyn AudioHandle>, BackendError>;
}

/// One loaded clip.
///
/// Dropping the handle must silence it.
#[async_trait]
pub trait AudioHandle: Send {
    /// Start or resume playback.
    ///
    /// The returned receiver fires once when the clip plays to its end. It is
    /// closed without firing if the handle is dropped first.
    async fn play(&mut self) -> Result<oneshot::Receiver<()>, BackendError>;

    /// Pause playback, keeping the position.
    fn pause(&mut self);

    /// Rewind to the start.
    fn reset_position(&mut self);
}
