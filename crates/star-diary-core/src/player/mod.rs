mod playback_state;
#[allow(clippy::module_inception)]
mod player;

pub use {
    playback_state::PlaybackPhase,
    player::{PlaybackEnded, Player, Selection},
};
