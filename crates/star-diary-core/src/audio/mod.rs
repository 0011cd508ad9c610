pub(crate) mod capture;
mod output;
mod resampler;
mod send_stream;
pub(crate) mod wav;

pub(crate) use {resampler::Resampler, send_stream::SendStream};

pub use {capture::CpalCaptureDevice, output::CpalAudioOutput};
