//! Star Diary: record short voice notes and keep them as stars in a night sky.

mod app;
mod app_command;
mod backend;
mod command_reader;
mod config;
mod error;
mod sky_view;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    command_reader::CommandReader,
    error::{AppError, Result as AppResult},
    sky_view::SkyView,
};

use crate::{backend::LocalBackend, config::Config};

use std::{path::Path, time::Duration};

use tokio::sync::{mpsc, watch};
use tracing::error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "star_diary=debug,star_diary_core=debug";
const LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "star-diary.log";

/// How long shutdown waits for the stdin reader thread.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

/// Log to a daily file under the data directory; stdout belongs to the sky.
fn init_logging(data_dir: &Path) -> WorkerGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let appender = tracing_appender::rolling::daily(data_dir.join(LOG_DIR), LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    guard
}

/// Application entry point.
fn main() {
    // Logging needs the data directory, so startup failures go to stderr.
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = config.validate_data_dir() {
        eprintln!("Data directory validation failed: {}", e);
        std::process::exit(1);
    }

    let log_guard = init_logging(&config.storage.data_dir);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            eprintln!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(run(config));

    // The stdin thread may still be parked in a read.
    rt.shutdown_timeout(SHUTDOWN_GRACE);

    if let Err(e) = result {
        error!(error = ?e, "Star Diary failed");
        eprintln!("{}", e.user_message());
        drop(log_guard);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> AppResult<()> {
    let services = LocalBackend::open(&config.storage.data_dir).await?;

    let (command_tx, command_rx) = mpsc::channel(32);
    let (feedback_tx, feedback_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let reader = CommandReader::new(command_tx, feedback_tx);
    let app = App::new(
        &services,
        config,
        SkyView::new(std::io::stdout()),
        command_rx,
        feedback_rx,
        shutdown_tx,
    );

    let (reader_result, app_result) =
        tokio::join!(reader.run(std::io::stdin(), shutdown_rx), app.run());

    if let Err(e) = reader_result {
        error!(error = ?e, "Command reader error");
    }
    app_result
}
