//! File-backed implementations of the diary's collaborators.
//!
//! Everything lives under one data directory:
//!
//! ```text
//! data_dir/
//!   accounts.json    salted password hashes
//!   documents.json   profiles and entry documents per user
//!   objects/         uploaded audio, one file per locator
//! ```

mod local_auth;
mod local_documents;
mod local_objects;

pub(crate) use {
    local_auth::LocalAuth, local_documents::LocalDocuments, local_objects::LocalObjects,
};

use crate::AppResult;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;
use star_diary_core::{BackendError, CpalAudioOutput, CpalCaptureDevice, Services};
use tracing::{info, instrument};
use uuid::Uuid;

const ACCOUNTS_FILE: &str = "accounts.json";
const DOCUMENTS_FILE: &str = "documents.json";
const OBJECTS_DIR: &str = "objects";

/// Builds the [`Services`] bundle for a data directory.
pub(crate) struct LocalBackend;

impl LocalBackend {
    /// Open (or initialise) the backend under `data_dir`, wired to the
    /// default microphone and speakers.
    #[instrument]
    pub(crate) async fn open(data_dir: &Path) -> AppResult<Services> {
        let auth = LocalAuth::open(data_dir.join(ACCOUNTS_FILE)).await?;
        let documents = LocalDocuments::open(data_dir.join(DOCUMENTS_FILE)).await?;
        let objects = LocalObjects::new(data_dir.join(OBJECTS_DIR));

        info!(data_dir = ?data_dir, "Local backend opened");

        Ok(Services {
            auth: Arc::new(auth),
            documents: Arc::new(documents),
            objects: Arc::new(objects),
            capture: Arc::new(CpalCaptureDevice::new()),
            output: Arc::new(CpalAudioOutput::new()),
        })
    }
}

/// Serialize `value` and replace `path` with it atomically.
pub(crate) async fn write_json_atomic<T: Serialize>(
    path: &Path,
    value: &T,
) -> Result<(), BackendError> {
    let contents = serde_json::to_vec_pretty(value)
        .map_err(|e| BackendError::new("internal", format!("Failed to serialize: {}", e)))?;
    write_atomic(path, &contents).await
}

/// Write `bytes` to a sibling temp file, then rename over `path`.
pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let io_error =
        |e: std::io::Error| BackendError::new("unavailable", format!("{}: {}", path.display(), e));

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let temp_path = temp_path_for(path);
    let written = match tokio::fs::write(&temp_path, bytes).await {
        Ok(()) => tokio::fs::rename(&temp_path, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        // Best effort cleanup.
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(io_error(e));
    }

    Ok(())
}

/// Unique per write, so concurrent writers never rename each other's file.
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
    path.with_file_name(name)
}
