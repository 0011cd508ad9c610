use crate::CaptureError;

use async_trait::async_trait;
use tokio::sync::mpsc;

/// Source of microphone streams.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Whether this platform can record at all.
    ///
    /// When false the recorder fails without asking for access.
    fn is_supported(&self) -> bool {
        true
    }

    /// Ask for access to an audio input.
    async fn request_audio_input(&self) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

/// An acquired audio input.
///
/// Lifecycle: `start` once, `stop` once, then `release`. `release` is also
/// valid without a prior `stop` and must be idempotent.
#[async_trait]
pub trait CaptureStream: Send {
    /// MIME type of the bytes this stream emits.
    fn media_type(&self) -> &str;

    /// Begin capturing; data chunks are sent on `chunks` as they become available.
    fn start(&mut self, chunks: mpsc::UnboundedSender<Vec<u8>>) -> Result<(), CaptureError>;

    /// Stop capturing. Every remaining chunk is sent before this returns.
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Stop all input tracks and let go of the device.
    fn release(&mut self);
}
