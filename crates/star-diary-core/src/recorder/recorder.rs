//! Record-toggle state machine.
//!
//! One toggle starts a capture, the next stops it and hands the blob to an
//! [`UploadJob`]. The job runs detached from the recorder so the caller's
//! event loop stays responsive; its [`UploadOutcome`] is fed back through
//! [`Recorder::finish_upload`].

use crate::{
    AuthService, CaptureDevice, CaptureError, CaptureStream, CoreResult, DiaryError,
    DocumentStore, NewEntry, ObjectStore, Services,
    placement::Position,
    recorder::{
        DEFAULT_MEDIA_TYPE, RecorderPhase, RecorderState, RecorderStatus, object_locator,
    },
};

use std::{mem, panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// How long the record control shows its "launching" state after a save.
pub const LAUNCH_WINDOW: Duration = Duration::from_millis(1400);

/// Result of a toggle.
#[derive(Debug)]
pub enum Toggle {
    /// Capture started.
    Started,
    /// Capture stopped; run the job, then pass its outcome to
    /// [`Recorder::finish_upload`].
    Stopped(UploadJob),
    /// A previous capture is still being saved; nothing happened.
    Busy,
}

/// Records voice notes and persists them as new entries.
pub struct Recorder {
    auth: Arc<dyn AuthService>,
    capture: Arc<dyn CaptureDevice>,
    objects: Arc<dyn ObjectStore>,
    documents: Arc<dyn DocumentStore>,
    created_tx: mpsc::UnboundedSender<String>,
    state: RecorderState,
    launching_until: Option<Instant>,
    permission_denied: bool,
}

impl Recorder {
    /// Create an idle recorder.
    ///
    /// The id of every entry it creates is sent once on `created_tx`.
    pub fn new(services: &Services, created_tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            auth: Arc::clone(&services.auth),
            capture: Arc::clone(&services.capture),
            objects: Arc::clone(&services.objects),
            documents: Arc::clone(&services.documents),
            created_tx,
            state: RecorderState::Idle,
            launching_until: None,
            permission_denied: false,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RecorderPhase {
        self.state.phase()
    }

    /// True while audio is being captured.
    pub fn is_recording(&self) -> bool {
        self.phase() == RecorderPhase::Recording
    }

    /// True while a save is in flight; the control should be disabled.
    pub fn is_busy(&self) -> bool {
        matches!(
            self.phase(),
            RecorderPhase::RequestingPermission | RecorderPhase::Stopping | RecorderPhase::Uploading
        )
    }

    /// True during the short window after a successful save.
    pub fn is_launching(&self) -> bool {
        self.launching_until
            .is_some_and(|until| Instant::now() < until)
    }

    /// What the record control should display.
    pub fn status(&self) -> RecorderStatus {
        if self.is_launching() {
            RecorderStatus::Launching
        } else if self.phase() == RecorderPhase::Uploading {
            RecorderStatus::Uploading
        } else if self.is_recording() {
            RecorderStatus::Recording
        } else if self.permission_denied {
            RecorderStatus::PermissionNeeded
        } else {
            RecorderStatus::Ready
        }
    }

    /// Start or stop a recording.
    ///
    /// Starting requires a signed-in user and microphone access. Stopping
    /// releases the device and returns the upload job for the captured blob.
    ///
    /// # Errors
    ///
    /// `Unauthenticated`, `PermissionDenied` or `DeviceUnavailable` when a
    /// start fails; `EmptyRecording`, `Unauthenticated` or
    /// `DeviceUnavailable` when a stop fails. The recorder is idle afterwards.
    #[instrument(skip(self))]
    pub async fn toggle(&mut self) -> CoreResult<Toggle> {
        match mem::replace(&mut self.state, RecorderState::Idle) {
            RecorderState::Idle => {
                self.start().await?;
                Ok(Toggle::Started)
            }
            RecorderState::Recording {
                session_id,
                started_at,
                stream,
                chunks,
            } => {
                let job = self.stop(session_id, started_at, stream, chunks).await?;
                Ok(Toggle::Stopped(job))
            }
            busy => {
                debug!(phase = ?busy.phase(), "Toggle ignored while busy");
                self.state = busy;
                Ok(Toggle::Busy)
            }
        }
    }

    /// Apply the outcome of an upload job.
    ///
    /// On success the new entry id is emitted on the created channel and
    /// returned. Outcomes for sessions this recorder no longer tracks (for
    /// example after [`Recorder::teardown`]) are ignored and yield `Ok(None)`.
    ///
    /// # Errors
    ///
    /// `PersistenceFailed` when the upload or the entry write failed.
    #[instrument(skip(self, outcome), fields(session_id = %outcome.session_id))]
    pub fn finish_upload(&mut self, outcome: UploadOutcome) -> CoreResult<Option<String>> {
        match self.state {
            RecorderState::Uploading { session_id } if session_id == outcome.session_id => {}
            _ => {
                debug!("Ignoring upload outcome for a session no longer tracked");
                return Ok(None);
            }
        }

        self.state = RecorderState::Idle;

        match outcome.result {
            Ok(entry_id) => {
                if self.created_tx.send(entry_id.clone()).is_err() {
                    warn!(entry_id = %entry_id, "Entry-created listener is gone");
                }
                self.launching_until = Some(Instant::now() + LAUNCH_WINDOW);
                info!(entry_id = %entry_id, "New star created");
                Ok(Some(entry_id))
            }
            Err(e) => {
                error!(error = ?e, "Failed to save recording");
                Err(e)
            }
        }
    }

    /// Drop any active capture without saving it.
    ///
    /// A pending upload job keeps running, but its outcome will be ignored.
    #[instrument(skip(self))]
    pub fn teardown(&mut self) {
        match mem::replace(&mut self.state, RecorderState::Idle) {
            RecorderState::Recording {
                session_id,
                mut stream,
                ..
            } => {
                stream.release();
                info!(session_id = %session_id, "Recording discarded on teardown");
            }
            RecorderState::Uploading { session_id } => {
                debug!(session_id = %session_id, "Detached from in-flight upload");
            }
            _ => {}
        }
        self.launching_until = None;
    }

    async fn start(&mut self) -> CoreResult<()> {
        let Some(user) = self.auth.current_user() else {
            return Err(DiaryError::Unauthenticated {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        if !self.capture.is_supported() {
            self.permission_denied = false;
            return Err(DiaryError::DeviceUnavailable {
                reason: "Recording is not supported on this platform".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.state = RecorderState::RequestingPermission;

        let mut stream = match self.capture.request_audio_input().await {
            Ok(stream) => stream,
            Err(e) => {
                self.state = RecorderState::Idle;
                self.permission_denied = matches!(e, CaptureError::PermissionDenied { .. });
                warn!(error = ?e, "Microphone request failed");
                return Err(DiaryError::from(e));
            }
        };

        let (chunks_tx, chunks) = mpsc::unbounded_channel();
        if let Err(e) = stream.start(chunks_tx) {
            stream.release();
            self.state = RecorderState::Idle;
            warn!(error = ?e, "Capture failed to start");
            return Err(DiaryError::from(e));
        }

        let session_id = Uuid::new_v4();
        self.state = RecorderState::Recording {
            session_id,
            started_at: Instant::now(),
            stream,
            chunks,
        };
        self.permission_denied = false;

        info!(session_id = %session_id, uid = %user.uid, "Recording started");

        Ok(())
    }

    async fn stop(
        &mut self,
        session_id: Uuid,
        started_at: Instant,
        mut stream: Box<dyn CaptureStream>,
        mut chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    ) -> CoreResult<UploadJob> {
        self.state = RecorderState::Stopping { session_id };

        let stopped = stream.stop().await;
        let media_type = match stream.media_type() {
            "" => DEFAULT_MEDIA_TYPE.to_string(),
            reported => reported.to_string(),
        };
        // The device is released whatever happened above.
        stream.release();
        drop(stream);

        let mut bytes = Vec::new();
        while let Ok(chunk) = chunks.try_recv() {
            bytes.extend_from_slice(&chunk);
        }

        self.state = RecorderState::Idle;

        if let Err(e) = stopped {
            warn!(session_id = %session_id, error = ?e, "Capture failed to stop cleanly");
            return Err(DiaryError::from(e));
        }

        info!(
            session_id = %session_id,
            duration_ms = started_at.elapsed().as_millis(),
            byte_len = bytes.len(),
            "Recording stopped"
        );

        if bytes.is_empty() {
            return Err(DiaryError::EmptyRecording {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let Some(user) = self.auth.current_user() else {
            return Err(DiaryError::Unauthenticated {
                location: ErrorLocation::from(Location::caller()),
            });
        };

        self.state = RecorderState::Uploading { session_id };

        Ok(UploadJob {
            session_id,
            uid: user.uid,
            bytes,
            media_type,
            objects: Arc::clone(&self.objects),
            documents: Arc::clone(&self.documents),
        })
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// A captured blob waiting to be persisted.
///
/// Owns everything it needs, so it can be spawned onto another task.
pub struct UploadJob {
    session_id: Uuid,
    uid: String,
    bytes: Vec<u8>,
    media_type: String,
    objects: Arc<dyn ObjectStore>,
    documents: Arc<dyn DocumentStore>,
}

impl std::fmt::Debug for UploadJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadJob")
            .field("session_id", &self.session_id)
            .field("uid", &self.uid)
            .field("byte_len", &self.bytes.len())
            .field("media_type", &self.media_type)
            .finish()
    }
}

impl UploadJob {
    /// Captured size in bytes.
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Upload the blob, then append the entry that points at it.
    ///
    /// If the entry write fails after the upload succeeded, the object is
    /// left in storage.
    #[instrument(skip(self), fields(session_id = %self.session_id, byte_len = self.bytes.len()))]
    pub async fn run(self) -> UploadOutcome {
        let UploadJob {
            session_id,
            uid,
            bytes,
            media_type,
            objects,
            documents,
        } = self;

        let locator = object_locator(&uid, &media_type);
        let position = Position::random();

        let result: CoreResult<String> = async {
            objects
                .upload(&locator, bytes, &media_type)
                .await
                .map_err(|e| DiaryError::PersistenceFailed {
                    source: e,
                    location: ErrorLocation::from(Location::caller()),
                })?;

            debug!(locator = %locator, "Audio object uploaded");

            let entry = NewEntry {
                storage_path: locator.clone(),
                position,
            };

            documents
                .append_entry(&uid, entry)
                .await
                .map_err(|e| DiaryError::PersistenceFailed {
                    source: e,
                    location: ErrorLocation::from(Location::caller()),
                })
        }
        .await;

        if let Err(e) = &result {
            warn!(locator = %locator, error = ?e, "Upload cycle failed");
        }

        UploadOutcome { session_id, result }
    }
}

/// What an [`UploadJob`] produced.
#[derive(Debug)]
pub struct UploadOutcome {
    /// Session the job belonged to.
    pub session_id: Uuid,
    /// New entry id, or why persisting failed.
    pub result: CoreResult<String>,
}
