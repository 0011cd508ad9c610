//! Speaker playback through cpal for `file://` WAV URLs.

use crate::{
    AudioError, AudioHandle, AudioOutput, BackendError,
    audio::{Resampler, SendStream, wav::decode_wav},
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::sync::oneshot;
use tracing::{debug, error, info, instrument, warn};

const FILE_SCHEME: &str = "file://";

/// Default system speakers.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalAudioOutput;

impl CpalAudioOutput {
    /// Handle to the host's default output device.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioOutput for CpalAudioOutput {
    #[instrument(skip(self))]
    async fn load(&self, url: &str) -> Result<Box<dyn AudioHandle>, BackendError> {
        let path = url
            .strip_prefix(FILE_SCHEME)
            .map(PathBuf::from)
            .ok_or_else(|| {
                BackendError::new("audio/unsupported-url", format!("Cannot play {}", url))
            })?;

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            BackendError::new("audio/read-failed", format!("{}: {}", path.display(), e))
        })?;

        // Decoding and resampling are CPU bound; keep them off the event loop.
        let handle = tokio::task::spawn_blocking(move || CpalAudioHandle::prepare(&bytes))
            .await
            .map_err(|e| BackendError::new("audio/load-panicked", e.to_string()))??;

        Ok(Box::new(handle))
    }
}

/// State shared between a handle and its output callback.
struct PlaybackShared {
    samples: Vec<f32>,
    position: AtomicUsize,
    paused: AtomicBool,
    ended: Mutex<Option<oneshot::Sender<()>>>,
}

struct CpalAudioHandle {
    device: Device,
    config: StreamConfig,
    stream: Option<SendStream>,
    shared: Arc<PlaybackShared>,
}

impl CpalAudioHandle {
    #[track_caller]
    fn prepare(bytes: &[u8]) -> Result<Self, BackendError> {
        let decoded = decode_wav(bytes)?;

        let device = cpal::default_host()
            .default_output_device()
            .ok_or(AudioError::NoDeviceFound {
                direction: "output",
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config: StreamConfig = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to get output config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .into();

        let samples = if decoded.sample_rate == config.sample_rate {
            decoded.samples
        } else {
            Resampler::new(decoded.sample_rate, config.sample_rate)?.convert(&decoded.samples)?
        };

        debug!(
            sample_count = samples.len(),
            output_rate = config.sample_rate,
            "Clip prepared"
        );

        Ok(Self {
            device,
            config,
            stream: None,
            shared: Arc::new(PlaybackShared {
                samples,
                position: AtomicUsize::new(0),
                paused: AtomicBool::new(true),
                ended: Mutex::new(None),
            }),
        })
    }

    #[track_caller]
    fn build_stream(&self) -> Result<Stream, AudioError> {
        let shared = Arc::clone(&self.shared);
        let channels = usize::from(self.config.channels.max(1));

        self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let value = if shared.paused.load(Ordering::Acquire) {
                            0.0
                        } else {
                            let position = shared.position.fetch_add(1, Ordering::AcqRel);
                            match shared.samples.get(position) {
                                Some(&sample) => sample,
                                None => {
                                    shared.position.store(shared.samples.len(), Ordering::Release);
                                    shared.paused.store(true, Ordering::Release);
                                    // Never block the audio thread; a missed lock retries next callback.
                                    if let Ok(mut ended) = shared.ended.try_lock()
                                        && let Some(tx) = ended.take()
                                    {
                                        let _ = tx.send(());
                                    }
                                    0.0
                                }
                            }
                        };
                        frame.fill(value);
                    }
                },
                |err| {
                    error!("Audio output stream error: {}", err);
                },
                None,
            )
            .map_err(|e| AudioError::DeviceError {
                reason: format!("Failed to build output stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

#[async_trait]
impl AudioHandle for CpalAudioHandle {
    #[instrument(skip(self))]
    async fn play(&mut self) -> Result<oneshot::Receiver<()>, BackendError> {
        let (ended_tx, ended_rx) = oneshot::channel();
        *self
            .shared
            .ended
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(ended_tx);

        if self.stream.is_none() {
            self.stream = Some(SendStream::new(self.build_stream()?));
        }

        self.shared.paused.store(false, Ordering::Release);

        if let Some(stream) = &self.stream {
            stream.play().map_err(|e| {
                BackendError::new("audio/device-error", format!("Failed to start output: {}", e))
            })?;
        }

        info!(
            sample_count = self.shared.samples.len(),
            "Output playback started"
        );

        Ok(ended_rx)
    }

    fn pause(&mut self) {
        self.shared.paused.store(true, Ordering::Release);
        if let Some(stream) = &self.stream
            && let Err(e) = stream.pause()
        {
            warn!(error = %e, "Failed to pause output stream");
        }
    }

    fn reset_position(&mut self) {
        self.shared.position.store(0, Ordering::Release);
    }
}
