use std::ops::Deref;

use cpal::Stream;

/// A cpal stream that can live inside a `Send` handle.
///
/// cpal marks `Stream` as `!Send` because a few backends require it to be
/// dropped on the creating thread. The owning handles only start, pause and
/// drop the stream, and the audio data itself is shared through atomics and
/// mutexes, never through the stream.
pub(crate) struct SendStream(Stream);

// SAFETY: see the type docs. The stream is only touched through `&self`
// play/pause calls and its destructor, never concurrently.
unsafe impl Send for SendStream {}

impl SendStream {
    pub(crate) fn new(stream: Stream) -> Self {
        Self(stream)
    }
}

impl Deref for SendStream {
    type Target = Stream;

    fn deref(&self) -> &Stream {
        &self.0
    }
}
