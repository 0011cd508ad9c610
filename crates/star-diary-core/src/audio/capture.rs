//! Microphone capture through cpal.
//!
//! Samples are buffered in memory while recording and handed over as a
//! single WAV chunk when the stream stops.

use crate::{
    AudioError, CaptureDevice, CaptureError, CaptureStream,
    audio::{
        SendStream,
        wav::{WAV_MEDIA_TYPE, encode_wav},
    },
};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use cpal::{
    Device, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

/// Maximum mono samples to buffer (5 minutes at 48kHz).
/// The oldest audio is dropped beyond this.
pub(crate) const MAX_BUFFER_SAMPLES: usize = 48_000 * 60 * 5;

/// Grace period for an in-flight callback after the stream is dropped.
const CALLBACK_DRAIN: Duration = Duration::from_millis(5);

/// Default system microphone.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalCaptureDevice;

impl CpalCaptureDevice {
    /// Handle to the host's default input device.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CaptureDevice for CpalCaptureDevice {
    fn is_supported(&self) -> bool {
        cpal::default_host().input_devices().is_ok()
    }

    #[instrument(skip(self))]
    async fn request_audio_input(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let stream = CpalCaptureStream::open()?;
        Ok(Box::new(stream))
    }
}

/// One open microphone.
struct CpalCaptureStream {
    device: Device,
    config: StreamConfig,
    stream: Option<SendStream>,
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Set before the stream is dropped so a late callback writes nothing.
    shutdown: Arc<AtomicBool>,
    chunks: Option<mpsc::UnboundedSender<Vec<u8>>>,
}

impl CpalCaptureStream {
    #[track_caller]
    fn open() -> Result<Self, CaptureError> {
        let host = cpal::default_host();

        let device = host.default_input_device().ok_or(AudioError::NoDeviceFound {
            direction: "input",
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config = device
            .default_input_config()
            .map_err(|e| classify(format!("Failed to get input config: {}", e)))?;

        info!(
            device_id = ?device.id(),
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "Microphone opened"
        );

        Ok(Self {
            device,
            config: config.into(),
            stream: None,
            samples: Arc::new(Mutex::new(VecDeque::new())),
            shutdown: Arc::new(AtomicBool::new(false)),
            chunks: None,
        })
    }

    fn take_samples(&self) -> Vec<f32> {
        let mut buf = self.samples.lock().unwrap_or_else(|e| {
            error!("Sample buffer lock poisoned, recovering: {}", e);
            e.into_inner()
        });
        buf.drain(..).collect()
    }

    fn close_stream(&mut self) -> bool {
        self.shutdown.store(true, Ordering::Release);
        self.stream.take().is_some()
    }
}

#[async_trait]
impl CaptureStream for CpalCaptureStream {
    fn media_type(&self) -> &str {
        WAV_MEDIA_TYPE
    }

    #[instrument(skip(self, chunks))]
    fn start(&mut self, chunks: mpsc::UnboundedSender<Vec<u8>>) -> Result<(), CaptureError> {
        let samples = Arc::clone(&self.samples);
        let shutdown = Arc::clone(&self.shutdown);
        let channels = usize::from(self.config.channels.max(1));

        self.shutdown.store(false, Ordering::Release);
        self.take_samples();

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    let mut buf = samples.lock().unwrap_or_else(|e| e.into_inner());
                    push_frames(&mut buf, data, channels);
                },
                |err| {
                    error!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| classify(format!("Failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| classify(format!("Failed to start input stream: {}", e)))?;

        self.stream = Some(SendStream::new(stream));
        self.chunks = Some(chunks);
        info!("Audio capture started");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&mut self) -> Result<(), CaptureError> {
        if self.close_stream() {
            tokio::time::sleep(CALLBACK_DRAIN).await;
            info!("Audio capture stopped");
        }

        let Some(chunks) = self.chunks.take() else {
            return Ok(());
        };

        let samples = self.take_samples();
        debug!(sample_count = samples.len(), "Captured audio samples");

        if samples.is_empty() {
            return Ok(());
        }

        let wav = encode_wav(&samples, self.config.sample_rate)?;
        if chunks.send(wav).is_err() {
            warn!("Recorder stopped listening before the final chunk");
        }

        Ok(())
    }

    fn release(&mut self) {
        if self.close_stream() {
            debug!("Microphone released");
        }
        self.chunks = None;
        self.take_samples();
    }
}

impl Drop for CpalCaptureStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// Mix interleaved frames down to mono and append them, dropping the
/// oldest samples past [`MAX_BUFFER_SAMPLES`].
pub(crate) fn push_frames(buf: &mut VecDeque<f32>, data: &[f32], channels: usize) {
    buf.extend(
        data.chunks(channels.max(1))
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32),
    );
    while buf.len() > MAX_BUFFER_SAMPLES {
        buf.pop_front();
    }
}

/// Platforms report refused microphone access as an ordinary backend error;
/// recognise it by its wording.
#[track_caller]
pub(crate) fn classify(reason: String) -> CaptureError {
    let location = ErrorLocation::from(Location::caller());
    let lowered = reason.to_ascii_lowercase();
    if lowered.contains("permission") || lowered.contains("not permitted") || lowered.contains("denied") {
        CaptureError::PermissionDenied { reason, location }
    } else {
        CaptureError::Unavailable { reason, location }
    }
}
