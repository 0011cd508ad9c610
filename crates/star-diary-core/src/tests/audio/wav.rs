use crate::{
    AudioError,
    audio::wav::{decode_wav, encode_wav},
};

use std::io::Cursor;

use hound::{SampleFormat, WavSpec, WavWriter};

const SAMPLE_RATE: u32 = 44100;
const QUANTIZATION_TOLERANCE: f32 = 1.0 / 16384.0;

/// WHAT: Captured samples survive the trip through a WAV blob
/// WHY: The recorder uploads exactly what the player later decodes
#[test]
#[allow(clippy::unwrap_used)]
fn given_captured_samples_when_encoded_and_decoded_then_rate_and_shape_kept() {
    // Given: A short ramp
    let samples: Vec<f32> = (0..441).map(|i| (i as f32 / 441.0) - 0.5).collect();

    // When: Encoding then decoding
    let bytes = encode_wav(&samples, SAMPLE_RATE).unwrap();
    let decoded = decode_wav(&bytes).unwrap();

    // Then: Same rate and length, values within 16-bit quantization
    assert_eq!(&bytes[..4], b"RIFF");
    assert_eq!(decoded.sample_rate, SAMPLE_RATE);
    assert_eq!(decoded.samples.len(), samples.len());
    assert!(
        decoded
            .samples
            .iter()
            .zip(&samples)
            .all(|(a, b)| (a - b).abs() < QUANTIZATION_TOLERANCE)
    );
}

/// WHAT: Out-of-range samples are clamped, not wrapped
/// WHY: A hot microphone must clip rather than produce noise bursts
#[test]
#[allow(clippy::unwrap_used)]
fn given_out_of_range_samples_when_encoded_then_clamped() {
    // Given: Samples beyond full scale
    let samples = [2.0f32, -3.0];

    // When: Encoding then decoding
    let decoded = decode_wav(&encode_wav(&samples, SAMPLE_RATE).unwrap()).unwrap();

    // Then: Pinned to full scale with the original sign
    assert!(decoded.samples[0] > 0.99);
    assert!(decoded.samples[1] < -0.99);
}

/// WHAT: Stereo files are mixed down to mono on decode
/// WHY: Output callbacks are fed one sample per frame
#[test]
#[allow(clippy::unwrap_used)]
fn given_stereo_wav_when_decoded_then_channels_averaged() {
    // Given: A stereo float WAV with opposite channels
    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut bytes = Vec::new();
    {
        let mut writer = WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
        for _ in 0..10 {
            writer.write_sample(0.5f32).unwrap();
            writer.write_sample(-0.5f32).unwrap();
        }
        writer.finalize().unwrap();
    }

    // When: Decoding
    let decoded = decode_wav(&bytes).unwrap();

    // Then: Ten silent mono frames
    assert_eq!(decoded.samples.len(), 10);
    assert!(decoded.samples.iter().all(|s| s.abs() < f32::EPSILON));
}

/// WHAT: Non-WAV bytes fail with a codec error
/// WHY: A corrupt object must surface as a playback failure, not a panic
#[test]
fn given_garbage_bytes_when_decoding_then_codec_error() {
    // Given / When: Bytes that aren't a RIFF file
    let result = decode_wav(b"definitely not audio");

    // Then: CodecError
    assert!(matches!(result, Err(AudioError::CodecError { .. })));
}
