use crate::{
    CaptureError,
    audio::capture::{MAX_BUFFER_SAMPLES, classify, push_frames},
};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// WHAT: Buffer respects MAX_BUFFER_SAMPLES limit
/// WHY: Prevents unbounded memory growth during long recordings
#[test]
fn given_buffer_at_max_capacity_when_pushing_frames_then_oldest_discarded() {
    // Given: A buffer at max capacity filled with 0.0
    let mut buf = VecDeque::with_capacity(MAX_BUFFER_SAMPLES);
    buf.extend(std::iter::repeat_n(0.0f32, MAX_BUFFER_SAMPLES));

    // When: Pushing 1024 mono frames of 1.0
    push_frames(&mut buf, &[1.0f32; 1024], 1);

    // Then: Buffer stays at MAX_BUFFER_SAMPLES and newest samples preserved
    assert_eq!(buf.len(), MAX_BUFFER_SAMPLES);
    assert!((buf[MAX_BUFFER_SAMPLES - 1] - 1.0).abs() < f32::EPSILON);
    assert!((buf[MAX_BUFFER_SAMPLES - 1024] - 1.0).abs() < f32::EPSILON);
    assert!(buf[MAX_BUFFER_SAMPLES - 1025].abs() < f32::EPSILON);
}

/// WHAT: Interleaved stereo is averaged into mono
/// WHY: Recordings are stored as single-channel audio
#[test]
fn given_stereo_frames_when_pushing_then_one_averaged_sample_per_frame() {
    // Given: Three stereo frames
    let mut buf = VecDeque::new();
    let data = [1.0f32, 0.0, 0.5, 0.5, -1.0, 1.0];

    // When: Pushing them
    push_frames(&mut buf, &data, 2);

    // Then: Three mono samples
    let mono: Vec<f32> = buf.into_iter().collect();
    assert_eq!(mono, vec![0.5, 0.5, 0.0]);
}

/// WHAT: Lock poison recovery preserves buffer data
/// WHY: Ensures audio data is never silently lost on mutex poison
#[test]
#[allow(clippy::unwrap_used, clippy::panic)]
fn given_poisoned_mutex_when_recovering_then_data_preserved() {
    // Given: A mutex poisoned by a panic while holding the lock
    let buf = Arc::new(Mutex::new(VecDeque::from(vec![0.5f32; 100])));
    let buf_clone = Arc::clone(&buf);

    let _ = std::thread::spawn(move || {
        let _guard = buf_clone.lock().unwrap();
        panic!("intentional panic to poison mutex");
    })
    .join();

    // When: Recovering and pushing more frames
    let mut recovered = buf.lock().unwrap_or_else(|e| e.into_inner());
    push_frames(&mut recovered, &[0.25f32; 4], 1);

    // Then: Original data is preserved and the new frames appended
    assert_eq!(recovered.len(), 104);
    assert!(recovered.iter().take(100).all(|&s| (s - 0.5).abs() < f32::EPSILON));
}

/// WHAT: Concurrent callbacks produce consistent state
/// WHY: Validates thread safety of Arc<Mutex<VecDeque>> under contention
#[test]
#[allow(clippy::unwrap_used)]
fn given_concurrent_writers_when_pushing_then_no_corruption() {
    // Given: Shared buffer simulating audio callback contention
    let buf = Arc::new(Mutex::new(VecDeque::with_capacity(MAX_BUFFER_SAMPLES)));
    let mut handles = vec![];

    // When: 4 threads push 1000 stereo batches of 48 frames each
    for i in 0..4u8 {
        let buf_clone = Arc::clone(&buf);
        handles.push(std::thread::spawn(move || {
            let batch = vec![f32::from(i); 96];
            for _ in 0..1000 {
                let mut b = buf_clone.lock().unwrap_or_else(|e| e.into_inner());
                push_frames(&mut b, &batch, 2);
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    // Then: 4 x 1000 x 48 mono samples, all finite
    let b = buf.lock().unwrap();
    assert_eq!(b.len(), 4 * 1000 * 48);
    assert!(b.iter().all(|s| s.is_finite()));
}

/// WHAT: Refusal wording maps to PermissionDenied, everything else to Unavailable
/// WHY: Only a refusal should show the permission hint
#[test]
fn given_backend_messages_when_classifying_then_refusals_recognised() {
    assert!(matches!(
        classify("Permission denied by the system".to_string()),
        CaptureError::PermissionDenied { .. }
    ));
    assert!(matches!(
        classify("Operation not permitted (os error 1)".to_string()),
        CaptureError::PermissionDenied { .. }
    ));
    assert!(matches!(
        classify("The requested device is no longer available".to_string()),
        CaptureError::Unavailable { .. }
    ));
}

/// WHAT: The default microphone records a short WAV clip
/// WHY: Exercises the real cpal path end to end on a machine with audio
#[tokio::test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
async fn given_default_microphone_when_recording_then_wav_chunk_delivered() {
    use crate::{CaptureDevice, CpalCaptureDevice, audio::wav::decode_wav};

    // Given: An open default microphone
    let device = CpalCaptureDevice::new();
    let mut stream = device.request_audio_input().await.unwrap();
    let (chunk_tx, mut chunk_rx) = tokio::sync::mpsc::unbounded_channel();

    // When: Recording for half a second
    stream.start(chunk_tx).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(500)).await;
    stream.stop().await.unwrap();

    // Then: One decodable WAV chunk arrives
    let chunk = chunk_rx.recv().await.unwrap();
    assert_eq!(stream.media_type(), "audio/wav");
    assert!(!decode_wav(&chunk).unwrap().samples.is_empty());
    stream.release();
}
