mod locator;
#[allow(clippy::module_inception)]
mod recorder;
mod recorder_state;
mod recorder_status;

pub(crate) use recorder_state::RecorderState;

pub use {
    locator::{DEFAULT_MEDIA_TYPE, extension_for, object_locator},
    recorder::{LAUNCH_WINDOW, Recorder, Toggle, UploadJob, UploadOutcome},
    recorder_state::RecorderPhase,
    recorder_status::{RecorderStatus, permission_hint},
};
