//! Single-flight audio player.
//!
//! Selecting a star stops whatever is playing before anything new is
//! resolved or loaded, so two clips never overlap. Selecting the playing
//! star again acts as a stop button.

use crate::{
    AudioOutput, CoreResult, DiaryError, Entry, ObjectStore, Services,
    player::{PlaybackPhase, playback_state::PlaybackState},
};

use std::{collections::HashMap, mem, panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// A clip reached its natural end.
///
/// Feed it back through [`Player::handle_ended`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackEnded {
    /// Entry whose clip finished.
    pub entry_id: String,
    generation: u64,
}

/// Result of [`Player::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The selected entry is now playing.
    Started,
    /// The selected entry was already active and has been stopped.
    Stopped,
}

/// Plays one entry's audio at a time.
pub struct Player {
    objects: Arc<dyn ObjectStore>,
    output: Arc<dyn AudioOutput>,
    url_cache: HashMap<String, String>,
    state: PlaybackState,
    generation: u64,
    ended_tx: mpsc::UnboundedSender<PlaybackEnded>,
}

impl Player {
    /// Create an idle player and the channel its end-of-clip events arrive on.
    pub fn new(services: &Services) -> (Self, mpsc::UnboundedReceiver<PlaybackEnded>) {
        let (ended_tx, ended_rx) = mpsc::unbounded_channel();
        let player = Self {
            objects: Arc::clone(&services.objects),
            output: Arc::clone(&services.output),
            url_cache: HashMap::new(),
            state: PlaybackState::Idle,
            generation: 0,
            ended_tx,
        };
        (player, ended_rx)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> PlaybackPhase {
        self.state.phase()
    }

    /// Entry currently playing.
    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            PlaybackState::Playing { entry_id, .. } => Some(entry_id),
            _ => None,
        }
    }

    /// Entry whose locator is being resolved.
    pub fn loading_id(&self) -> Option<&str> {
        match &self.state {
            PlaybackState::Resolving { entry_id } => Some(entry_id),
            _ => None,
        }
    }

    /// Play `entry`, or stop it if it is the active one.
    ///
    /// # Errors
    ///
    /// `PlaybackFailed` when the locator can't be resolved or the clip
    /// can't start. The player is idle afterwards; nothing is retried.
    #[instrument(skip(self, entry), fields(entry_id = %entry.id))]
    pub async fn select(&mut self, entry: &Entry) -> CoreResult<Selection> {
        if self.state.entry_id() == Some(entry.id.as_str()) {
            self.stop();
            return Ok(Selection::Stopped);
        }

        // Tear down before the first await so no two handles ever coexist.
        self.stop();

        self.generation = self.generation.wrapping_add(1);
        let generation = self.generation;
        self.state = PlaybackState::Resolving {
            entry_id: entry.id.clone(),
        };

        match self.start(entry, generation).await {
            Ok(()) => {
                info!(generation, "Playback started");
                Ok(Selection::Started)
            }
            Err(e) => {
                self.state = PlaybackState::Idle;
                warn!(error = ?e, "Playback failed");
                Err(e)
            }
        }
    }

    /// Stop and release whatever is playing.
    #[instrument(skip(self))]
    pub fn stop(&mut self) {
        match mem::replace(&mut self.state, PlaybackState::Idle) {
            PlaybackState::Playing {
                entry_id,
                mut handle,
                ..
            } => {
                handle.pause();
                handle.reset_position();
                drop(handle);
                debug!(entry_id = %entry_id, "Playback stopped");
            }
            PlaybackState::Resolving { entry_id } => {
                debug!(entry_id = %entry_id, "Resolution abandoned");
            }
            PlaybackState::Idle => {}
        }
    }

    /// Apply an end-of-clip event.
    ///
    /// Returns true when it belonged to the active clip, which is then
    /// released. Events from clips that were already replaced are ignored.
    pub fn handle_ended(&mut self, ended: PlaybackEnded) -> bool {
        let is_current = matches!(
            &self.state,
            PlaybackState::Playing { generation, .. } if *generation == ended.generation
        );
        if !is_current {
            return false;
        }

        self.state = PlaybackState::Idle;
        debug!(entry_id = %ended.entry_id, "Playback finished");
        true
    }

    /// Stop playback for good; called when the hosting view goes away.
    pub fn teardown(&mut self) {
        self.stop();
    }

    async fn start(&mut self, entry: &Entry, generation: u64) -> CoreResult<()> {
        let url = self.resolve(entry).await?;

        let mut handle = self
            .output
            .load(&url)
            .await
            .map_err(|e| DiaryError::PlaybackFailed {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let ended = handle.play().await.map_err(|e| DiaryError::PlaybackFailed {
            source: e,
            location: ErrorLocation::from(Location::caller()),
        })?;

        let ended_tx = self.ended_tx.clone();
        let entry_id = entry.id.clone();
        tokio::spawn(async move {
            // A dropped handle closes the receiver without firing.
            if ended.await.is_ok() {
                let _ = ended_tx.send(PlaybackEnded {
                    entry_id,
                    generation,
                });
            }
        });

        self.state = PlaybackState::Playing {
            entry_id: entry.id.clone(),
            generation,
            handle,
        };

        Ok(())
    }

    async fn resolve(&mut self, entry: &Entry) -> CoreResult<String> {
        if let Some(url) = self.url_cache.get(&entry.id) {
            debug!("Locator resolved from cache");
            return Ok(url.clone());
        }

        let url = self
            .objects
            .resolve(&entry.locator)
            .await
            .map_err(|e| DiaryError::PlaybackFailed {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.url_cache.insert(entry.id.clone(), url.clone());
        debug!(locator = %entry.locator, "Locator resolved");

        Ok(url)
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.teardown();
    }
}
