use crate::audio::Resampler;

const RECORDED_RATE: u32 = 16000;
const DEVICE_RATE: u32 = 48000;
const ONE_SECOND_RECORDED: usize = RECORDED_RATE as usize;
const ONE_SECOND_DEVICE: usize = DEVICE_RATE as usize;
const LENGTH_TOLERANCE: u64 = 2400;
const TEST_SIGNAL_AMPLITUDE: f32 = 0.5;
const TONE_INPUT_SAMPLES: usize = 4800;
const TONE_FREQUENCY_FACTOR: f32 = 0.1;
const TONE_OUTPUT_SAMPLES: usize = 1539;
const TONE_LENGTH_TOLERANCE: u64 = 100;
const MAX_AMPLITUDE: f32 = 1.5;

/// WHAT: A clip recorded at 16kHz is stretched to a 48kHz device
/// WHY: Playback runs at whatever rate the output device uses
#[test]
#[allow(clippy::unwrap_used)]
fn given_16khz_clip_when_converting_to_48khz_then_length_scaled() {
    // Given: One second of audio at the recorded rate
    let mut resampler = Resampler::new(RECORDED_RATE, DEVICE_RATE).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; ONE_SECOND_RECORDED];

    // When: Converting
    let output = resampler.convert(&input).unwrap();

    // Then: About one second at the device rate, never longer
    assert!(output.len() <= ONE_SECOND_DEVICE);
    assert!(
        (output.len() as i64 - ONE_SECOND_DEVICE as i64).unsigned_abs() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        ONE_SECOND_DEVICE,
        output.len()
    );
    assert!(output.iter().all(|&s| s.is_finite()));
}

/// WHAT: Empty clips convert to empty output
/// WHY: Edge case handling for zero-length input
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_clip_when_converting_then_empty_output() {
    // Given: Resampler and empty input
    let mut resampler = Resampler::new(DEVICE_RATE, RECORDED_RATE).unwrap();

    // When: Converting nothing
    let output = resampler.convert(&[]).unwrap();

    // Then: Output is also empty
    assert!(output.is_empty());
}

/// WHAT: Downsampling a tone keeps it bounded and about the right length
/// WHY: Validates that audio quality is maintained through conversion
#[test]
#[allow(clippy::unwrap_used)]
fn given_tone_signal_when_downsampling_then_output_preserves_characteristics() {
    // Given: A 48kHz clip played on a 16kHz device
    let mut resampler = Resampler::new(DEVICE_RATE, RECORDED_RATE).unwrap();
    let input: Vec<f32> = (0..TONE_INPUT_SAMPLES)
        .map(|i| (i as f32 * TONE_FREQUENCY_FACTOR).sin())
        .collect();

    // When: Converting the signal
    let output = resampler.convert(&input).unwrap();

    // Then: Output has expected length and all samples are finite
    assert!(
        (output.len() as i64 - TONE_OUTPUT_SAMPLES as i64).unsigned_abs() < TONE_LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        TONE_OUTPUT_SAMPLES,
        output.len()
    );
    assert!(
        output
            .iter()
            .all(|&s| s.is_finite() && s.abs() <= MAX_AMPLITUDE)
    );
}
