use crate::AudioHandle;

/// Player lifecycle. At most one handle exists, and only in `Playing`.
pub(crate) enum PlaybackState {
    Idle,
    Resolving {
        entry_id: String,
    },
    Playing {
        entry_id: String,
        generation: u64,
        handle: Box<dyn AudioHandle>,
    },
}

impl PlaybackState {
    pub(crate) fn phase(&self) -> PlaybackPhase {
        match self {
            PlaybackState::Idle => PlaybackPhase::Idle,
            PlaybackState::Resolving { .. } => PlaybackPhase::Resolving,
            PlaybackState::Playing { .. } => PlaybackPhase::Playing,
        }
    }

    pub(crate) fn entry_id(&self) -> Option<&str> {
        match self {
            PlaybackState::Idle => None,
            PlaybackState::Resolving { entry_id } | PlaybackState::Playing { entry_id, .. } => {
                Some(entry_id)
            }
        }
    }
}

/// Observable player phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Nothing playing.
    Idle,
    /// Turning a locator into a playable URL.
    Resolving,
    /// Audio is playing.
    Playing,
}
