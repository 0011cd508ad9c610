/// What the record control should say right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderStatus {
    /// A star was just created.
    Launching,
    /// The last capture is being saved.
    Uploading,
    /// Capture in progress.
    Recording,
    /// The last start was refused microphone access.
    PermissionNeeded,
    /// Waiting for the user.
    Ready,
}

impl RecorderStatus {
    /// Status line for the record control.
    pub fn message(&self) -> &'static str {
        match self {
            RecorderStatus::Launching => "A new star rose into the night sky!",
            RecorderStatus::Uploading => "Sending your new star up...",
            RecorderStatus::Recording => "Recording... toggle again to make a star",
            RecorderStatus::PermissionNeeded => "Allow microphone access to make stars",
            RecorderStatus::Ready => "Toggle the recorder and tell the sky about your day",
        }
    }
}

/// How to re-enable microphone access on this platform.
pub fn permission_hint() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "macOS: System Settings > Privacy & Security > Microphone, allow this app, then restart it."
    }
    #[cfg(target_os = "windows")]
    {
        "Windows: Settings > Privacy & security > Microphone, turn on microphone access for desktop apps, then restart."
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        "Check that your user can open the audio input device (PipeWire/PulseAudio/ALSA), then restart."
    }
}
