//! WAV encoding for captured audio and decoding for playback.

use crate::AudioError;

use std::{io::Cursor, panic::Location};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// MIME type of the bytes produced by [`encode_wav`].
pub(crate) const WAV_MEDIA_TYPE: &str = "audio/wav";

/// Mono samples at a known rate.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DecodedAudio {
    pub(crate) samples: Vec<f32>,
    pub(crate) sample_rate: u32,
}

/// Encode mono `f32` samples as 16-bit PCM WAV.
#[track_caller]
pub(crate) fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, AudioError> {
    let location = Location::caller();
    let codec_error = |e: hound::Error| AudioError::CodecError {
        reason: format!("Failed to encode WAV: {}", e),
        location: ErrorLocation::from(location),
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut bytes = Vec::with_capacity(44 + samples.len() * 2);
    {
        let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).map_err(codec_error)?;
        for &sample in samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer
                .write_sample((clamped * f32::from(i16::MAX)) as i16)
                .map_err(codec_error)?;
        }
        writer.finalize().map_err(codec_error)?;
    }

    Ok(bytes)
}

/// Decode a WAV file, mixing every channel down to mono.
#[track_caller]
pub(crate) fn decode_wav(bytes: &[u8]) -> Result<DecodedAudio, AudioError> {
    let location = Location::caller();
    let codec_error = |e: hound::Error| AudioError::CodecError {
        reason: format!("Failed to decode WAV: {}", e),
        location: ErrorLocation::from(location),
    };

    let mut reader = WavReader::new(Cursor::new(bytes)).map_err(codec_error)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(codec_error)?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|s| s as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(codec_error)?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();

    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
    })
}
