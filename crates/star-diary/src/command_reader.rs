//! Line-oriented command input.
//!
//! Reads stdin on a dedicated blocking task and forwards parsed commands to
//! the main application over an async channel.

use crate::{AppCommand, AppError, AppResult};

use std::{
    io::{BufRead, BufReader, Read},
    panic::Location,
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Parses input lines into [`AppCommand`]s.
pub struct CommandReader {
    command_tx: mpsc::Sender<AppCommand>,
    feedback_tx: mpsc::UnboundedSender<String>,
}

impl CommandReader {
    /// Create a reader that sends commands on `command_tx` and parse errors
    /// on `feedback_tx`.
    pub fn new(
        command_tx: mpsc::Sender<AppCommand>,
        feedback_tx: mpsc::UnboundedSender<String>,
    ) -> Self {
        Self {
            command_tx,
            feedback_tx,
        }
    }

    /// Run the reader until shutdown or end of input.
    ///
    /// End of input is treated as `quit`.
    #[instrument(skip_all)]
    pub async fn run<R>(&self, input: R, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()>
    where
        R: Read + Send + 'static,
    {
        let (line_tx, mut line_rx) = mpsc::channel(32);

        // Single persistent blocking task that forwards input lines.
        //
        // Shutdown: when line_rx is dropped (loop breaks), the next
        // line_tx.blocking_send() fails, breaking the blocking loop.
        let handle = tokio::task::spawn_blocking(move || {
            for line in BufReader::new(input).lines() {
                match line {
                    Ok(line) => {
                        if line_tx.blocking_send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read input");
                        break;
                    }
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Command reader shutting down");
                    break;
                }
                line = line_rx.recv() => {
                    let Some(line) = line else {
                        debug!("End of input");
                        self.send(AppCommand::Quit).await?;
                        break;
                    };
                    self.handle_line(&line).await?;
                }
            }
        }

        drop(line_rx);

        // The blocking task may be parked in read() until the next line.
        match tokio::time::timeout(Duration::from_millis(100), handle).await {
            Ok(Ok(())) => debug!("Input forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Input forwarder task panicked"),
            Err(_) => debug!("Input forwarder still blocked on read, will be cleaned up on exit"),
        }

        Ok(())
    }

    async fn handle_line(&self, line: &str) -> AppResult<()> {
        match AppCommand::parse(line) {
            Ok(Some(command)) => self.send(command).await,
            Ok(None) => Ok(()),
            Err(e) => {
                debug!(error = ?e, "Rejected input line");
                // The app prints feedback; a closed channel just means it's gone.
                let _ = self.feedback_tx.send(e.user_message());
                Ok(())
            }
        }
    }

    async fn send(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
