use crate::{
    AppCommand, AppError, AppResult, SkyView,
    app_command::HELP,
    config::Config,
    sky_view::StarMark,
};

use std::{io::Write, ops::ControlFlow, panic::Location};

use error_location::ErrorLocation;
use star_diary_core::{
    AuthSession, DiaryError, Entry, FeedController, PlaybackEnded, Player, Recorder, Selection,
    Services, Toggle, UploadOutcome, User, permission_hint,
};
use tokio::{
    sync::{mpsc, watch},
    time::{Instant, sleep_until},
};
use tracing::{error, info, instrument, warn};

/// Main application state.
///
/// Owns the recorder, player and feed, and multiplexes user commands with
/// every asynchronous event they produce on a single task.
pub struct App<W: Write> {
    session: AuthSession,
    recorder: Recorder,
    player: Player,
    feed: FeedController,
    view: SkyView<W>,
    config: Config,
    command_rx: mpsc::Receiver<AppCommand>,
    feedback_rx: mpsc::UnboundedReceiver<String>,
    shutdown_tx: watch::Sender<bool>,
    auth_rx: watch::Receiver<Option<User>>,
    created_rx: mpsc::UnboundedReceiver<String>,
    ended_rx: mpsc::UnboundedReceiver<PlaybackEnded>,
    upload_tx: mpsc::UnboundedSender<UploadOutcome>,
    upload_rx: mpsc::UnboundedReceiver<UploadOutcome>,
    uid: Option<String>,
}

impl<W: Write> App<W> {
    /// Wire the state machines to `services`.
    pub fn new(
        services: &Services,
        config: Config,
        view: SkyView<W>,
        command_rx: mpsc::Receiver<AppCommand>,
        feedback_rx: mpsc::UnboundedReceiver<String>,
        shutdown_tx: watch::Sender<bool>,
    ) -> Self {
        let session = AuthSession::new(services);
        let auth_rx = session.subscribe();
        let (created_tx, created_rx) = mpsc::unbounded_channel();
        let (player, ended_rx) = Player::new(services);
        let (upload_tx, upload_rx) = mpsc::unbounded_channel();

        Self {
            recorder: Recorder::new(services, created_tx),
            feed: FeedController::new(services),
            session,
            player,
            view,
            config,
            command_rx,
            feedback_rx,
            shutdown_tx,
            auth_rx,
            created_rx,
            ended_rx,
            upload_tx,
            upload_rx,
            uid: None,
        }
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Star Diary starting");

        let user = self.auth_rx.borrow_and_update().clone();
        if let Some(user) = &user {
            self.session.refresh_profile(user).await;
        }
        self.on_auth_changed(user.as_ref());
        self.view.whoami(user.as_ref());
        self.view.line("Type 'help' for commands.");

        let mut auth_open = true;

        loop {
            let highlight_deadline = self.feed.highlight_deadline();

            tokio::select! {
                Some(command) = self.command_rx.recv() => {
                    match self.handle_command(command).await {
                        Ok(ControlFlow::Break(())) => {
                            info!("Shutdown requested");
                            break;
                        }
                        Ok(ControlFlow::Continue(())) => {}
                        Err(e) => self.report(&e),
                    }
                }

                Some(feedback) = self.feedback_rx.recv() => {
                    self.view.error(&feedback);
                }

                changed = self.auth_rx.changed(), if auth_open => {
                    if changed.is_err() {
                        warn!("Auth provider closed its session stream");
                        auth_open = false;
                        continue;
                    }
                    let user = self.auth_rx.borrow_and_update().clone();
                    self.on_auth_changed(user.as_ref());
                }

                Some(snapshot) = self.feed.next_snapshot() => {
                    if self.feed.apply_snapshot(snapshot) {
                        self.render();
                    }
                }

                Some(outcome) = self.upload_rx.recv() => {
                    match self.recorder.finish_upload(outcome) {
                        Ok(Some(_)) => self.view.status(self.recorder.status()),
                        Ok(None) => {}
                        Err(e) => self.report(&AppError::from(e)),
                    }
                }

                Some(entry_id) = self.created_rx.recv() => {
                    self.feed.entry_created(entry_id);
                    if self.feed.highlighted_id().is_some() {
                        self.render();
                    }
                }

                Some(ended) = self.ended_rx.recv() => {
                    let entry_id = ended.entry_id.clone();
                    if self.player.handle_ended(ended) {
                        info!(entry_id = %entry_id, "Clip finished");
                        self.view.line("Playback finished.");
                    }
                }

                _ = sleep_until(highlight_deadline.unwrap_or_else(Instant::now)),
                    if highlight_deadline.is_some() =>
                {
                    if self.feed.expire_highlight() {
                        self.render();
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        self.recorder.teardown();
        self.player.teardown();
        self.feed.detach();

        let _ = self.shutdown_tx.send(true);
        info!("Star Diary shut down successfully");

        Ok(())
    }

    #[instrument(skip_all)]
    async fn handle_command(&mut self, command: AppCommand) -> AppResult<ControlFlow<()>> {
        match command {
            AppCommand::SignUp { email, password } => {
                let user = self.session.sign_up(&email, &password).await?;
                self.remember_email(&user);
                self.view.whoami(Some(&user));
            }
            AppCommand::SignIn { email, password } => {
                let email = email
                    .or_else(|| self.config.account.remember_email.clone())
                    .ok_or_else(|| AppError::InvalidCommand {
                        reason: "No remembered email. Use: signin <email> <password>".to_string(),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
                let user = self.session.sign_in(&email, &password).await?;
                self.remember_email(&user);
                self.view.whoami(Some(&user));
            }
            AppCommand::SignOut => {
                self.session.sign_out().await?;
                self.view.whoami(None);
            }
            AppCommand::ToggleRecording => self.toggle_recording().await?,
            AppCommand::Play { index } => self.play(index).await?,
            AppCommand::List => self.render(),
            AppCommand::WhoAmI => {
                let user = self.session.current_user();
                self.view.whoami(user.as_ref());
            }
            AppCommand::Help => self.view.line(HELP),
            AppCommand::Quit => return Ok(ControlFlow::Break(())),
        }

        Ok(ControlFlow::Continue(()))
    }

    async fn toggle_recording(&mut self) -> AppResult<()> {
        match self.recorder.toggle().await? {
            Toggle::Started => {}
            Toggle::Stopped(job) => {
                let upload_tx = self.upload_tx.clone();
                tokio::spawn(async move {
                    let outcome = job.run().await;
                    // The app may have shut down while the job ran.
                    let _ = upload_tx.send(outcome);
                });
            }
            Toggle::Busy => {}
        }

        self.view.status(self.recorder.status());
        Ok(())
    }

    async fn play(&mut self, index: usize) -> AppResult<()> {
        let entry: Entry = self
            .feed
            .entries()
            .get(index.saturating_sub(1))
            .cloned()
            .ok_or_else(|| AppError::InvalidCommand {
                reason: format!("There is no star number {}. Try 'list'.", index),
                location: ErrorLocation::from(Location::caller()),
            })?;

        match self.player.select(&entry).await? {
            Selection::Started => self.view.line(&format!("Playing: {}", entry.label())),
            Selection::Stopped => self.view.line("Stopped."),
        }

        Ok(())
    }

    /// Follow the new session. Playback never carries over to another user.
    fn on_auth_changed(&mut self, user: Option<&User>) {
        let uid = user.map(|u| u.uid.clone());
        if uid != self.uid {
            self.player.stop();
            self.uid = uid;
        }
        self.feed.attach(user);
    }

    fn remember_email(&mut self, user: &User) {
        if user.email == self.config.account.remember_email {
            return;
        }
        self.config.account.remember_email = user.email.clone();
        if let Err(e) = self.config.save() {
            warn!(error = ?e, "Failed to remember email");
        }
    }

    fn render(&mut self) {
        let highlighted = self.feed.highlighted_id().map(str::to_string);
        let active = self
            .player
            .active_id()
            .or(self.player.loading_id())
            .map(str::to_string);

        self.view.render_sky(self.feed.entries(), |entry| {
            if active.as_deref() == Some(entry.id.as_str()) {
                StarMark::Active
            } else if highlighted.as_deref() == Some(entry.id.as_str()) {
                StarMark::New
            } else {
                StarMark::Plain
            }
        });
    }

    fn report(&mut self, error: &AppError) {
        error!(error = ?error, "Command failed");
        self.view.error(&error.user_message());
        if matches!(
            error,
            AppError::Diary {
                source: DiaryError::PermissionDenied { .. },
                ..
            }
        ) {
            self.view.line(permission_hint());
        }
    }
}
