//! Star Diary Core Library
//!
//! Client-side state machines for a voice diary drawn as a night sky:
//! a recorder that captures and persists short notes, a single-flight
//! player, and a live feed that places each note as a star.
//!
//! Every external collaborator (auth, documents, objects, microphone,
//! speakers) is injected through [`Services`], so the state machines run
//! the same against a real backend or a test double.
//!
//! # Example
//!
//! ```no_run
//! use star_diary_core::{CoreResult, FeedController, Player, Recorder, Services, Toggle};
//!
//! async fn record_once(services: &Services) -> CoreResult<()> {
//!     let (created_tx, mut created_rx) = tokio::sync::mpsc::unbounded_channel();
//!     let mut recorder = Recorder::new(services, created_tx);
//!     let mut feed = FeedController::new(services);
//!     feed.attach(services.auth.current_user().as_ref());
//!
//!     recorder.toggle().await?;
//!     if let Toggle::Stopped(job) = recorder.toggle().await? {
//!         recorder.finish_upload(job.run().await)?;
//!     }
//!
//!     if let Some(entry_id) = created_rx.recv().await {
//!         feed.entry_created(entry_id);
//!     }
//!
//!     let (_player, _ended_rx) = Player::new(services);
//!     Ok(())
//! }
//! ```

mod audio;
mod entry;
mod error;
mod feed;
mod placement;
mod player;
mod recorder;
mod services;
mod session;

pub use {
    audio::{CpalAudioOutput, CpalCaptureDevice},
    entry::{Entry, EntryDocument, NewEntry},
    error::{AudioError, BackendError, CaptureError, DiaryError, Result as CoreResult},
    feed::{FeedController, HIGHLIGHT_DWELL},
    placement::{Position, place, twinkle_offset},
    player::{PlaybackEnded, PlaybackPhase, Player, Selection},
    recorder::{
        DEFAULT_MEDIA_TYPE, LAUNCH_WINDOW, Recorder, RecorderPhase, RecorderStatus, Toggle,
        UploadJob, UploadOutcome, extension_for, object_locator, permission_hint,
    },
    services::{
        AudioHandle, AudioOutput, AuthService, CaptureDevice, CaptureStream, DocumentStore,
        ObjectStore, Services, Subscription, User,
    },
    session::{AuthSession, auth_error_message},
};

#[cfg(test)]
mod tests;
