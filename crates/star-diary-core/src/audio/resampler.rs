use crate::AudioError;

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Mono sample-rate converter.
///
/// Recordings keep the microphone's native rate; playback converts them to
/// whatever the output device runs at.
pub(crate) struct Resampler {
    inner: Fft<f32>,
    from_rate: u32,
    to_rate: u32,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub(crate) fn new(from_rate: u32, to_rate: u32) -> Result<Self, AudioError> {
        let inner = Fft::<f32>::new(
            from_rate as usize,
            to_rate as usize,
            CHUNK_FRAMES,
            SUB_CHUNKS,
            1,
            FixedSync::Input,
        )
        .map_err(|e| AudioError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(from_rate, to_rate, "Resampler initialized");

        Ok(Self {
            inner,
            from_rate,
            to_rate,
        })
    }

    /// Convert a whole clip. The tail is zero-padded to a full chunk and
    /// the output trimmed back to the expected length.
    #[track_caller]
    #[instrument(skip(self, samples), fields(input_len = samples.len()))]
    pub(crate) fn convert(&mut self, samples: &[f32]) -> Result<Vec<f32>, AudioError> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let location = Location::caller();
        let resampling_error = |reason: String| AudioError::ResamplingError {
            reason,
            location: ErrorLocation::from(location),
        };

        let expected_len =
            (samples.len() as f64 * f64::from(self.to_rate) / f64::from(self.from_rate)) as usize;
        // The FFT resampler may round the requested chunk up to fit the ratio.
        let chunk_frames = self.inner.input_frames_next();
        let mut converted = Vec::with_capacity(expected_len + chunk_frames);
        let mut input = vec![0.0f32; chunk_frames];
        let mut output = vec![0.0f32; self.inner.output_frames_max()];

        for chunk in samples.chunks(chunk_frames) {
            input[..chunk.len()].copy_from_slice(chunk);
            input[chunk.len()..].fill(0.0);

            let input_adapter = InterleavedSlice::new(&input, 1, chunk_frames)
                .map_err(|e| resampling_error(format!("Bad input buffer: {}", e)))?;
            let output_frames = output.len();
            let mut output_adapter = InterleavedSlice::new_mut(&mut output, 1, output_frames)
                .map_err(|e| resampling_error(format!("Bad output buffer: {}", e)))?;

            let (_, written) = self
                .inner
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| resampling_error(format!("Resampling failed: {}", e)))?;

            converted.extend_from_slice(&output[..written]);
        }

        converted.truncate(expected_len);

        debug!(output_len = converted.len(), "Clip resampled");

        Ok(converted)
    }
}
