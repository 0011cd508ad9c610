//! Profiles and entry documents in a JSON file, with live subscribers.

use crate::{AppError, AppResult, backend::write_json_atomic};

use std::{
    collections::BTreeMap,
    panic::Location,
    path::PathBuf,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::Utc;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use star_diary_core::{
    BackendError, DocumentStore, EntryDocument, NewEntry, Subscription, User,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct DocumentFile {
    users: BTreeMap<String, UserDocuments>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserDocuments {
    #[serde(default)]
    profile: Option<Value>,
    #[serde(default)]
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    id: String,
    data: Value,
}

impl From<&StoredEntry> for EntryDocument {
    fn from(stored: &StoredEntry) -> Self {
        EntryDocument {
            id: stored.id.clone(),
            data: stored.data.clone(),
        }
    }
}

type Subscriber = (String, mpsc::UnboundedSender<Vec<EntryDocument>>);

/// Local stand-in for a hosted document database.
///
/// Entries are kept in append order, which is creation order.
pub(crate) struct LocalDocuments {
    path: PathBuf,
    state: Mutex<DocumentFile>,
    subscribers: Mutex<Vec<Subscriber>>,
    /// Held from mutation through the file rename so writes land in order.
    write_lock: tokio::sync::Mutex<()>,
}

impl LocalDocuments {
    /// Load documents from `path`; a missing file means an empty store.
    pub(crate) async fn open(path: PathBuf) -> AppResult<Self> {
        let location = Location::caller();

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| AppError::ConfigError {
                reason: format!("Corrupt documents file {:?}: {}", path, e),
                location: ErrorLocation::from(location),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DocumentFile::default(),
            Err(e) => {
                return Err(AppError::IoError {
                    source: e,
                    location: ErrorLocation::from(location),
                });
            }
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
            subscribers: Mutex::new(Vec::new()),
            write_lock: tokio::sync::Mutex::new(()),
        })
    }

    fn state(&self) -> MutexGuard<'_, DocumentFile> {
        self.state.lock().unwrap_or_else(|e| {
            error!("Document state lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn snapshot(&self, uid: &str) -> Vec<EntryDocument> {
        self.state()
            .users
            .get(uid)
            .map(|docs| docs.entries.iter().map(EntryDocument::from).collect())
            .unwrap_or_default()
    }

    /// Push the current snapshot to every live subscriber of `uid`,
    /// forgetting the ones that went away.
    fn broadcast(&self, uid: &str) {
        let snapshot = self.snapshot(uid);
        self.subscribers().retain(|(owner, tx)| {
            if owner != uid {
                return !tx.is_closed();
            }
            tx.send(snapshot.clone()).is_ok()
        });
    }

    async fn persist(&self) -> Result<(), BackendError> {
        let state = self.state().clone();
        write_json_atomic(&self.path, &state).await
    }
}

#[async_trait]
impl DocumentStore for LocalDocuments {
    fn subscribe_entries(&self, uid: &str) -> Subscription<Vec<EntryDocument>> {
        let (tx, subscription) = Subscription::channel(format!("users/{}/entries", uid));

        // The first message is the current snapshot.
        let _ = tx.send(self.snapshot(uid));
        self.subscribers().push((uid.to_string(), tx));

        debug!(uid = %uid, "Entry subscriber added");
        subscription
    }

    #[instrument(skip(self, entry), fields(locator = %entry.storage_path))]
    async fn append_entry(&self, uid: &str, entry: NewEntry) -> Result<String, BackendError> {
        let namespace = format!("entries/{}/", uid);
        if !entry.storage_path.starts_with(&namespace) {
            return Err(BackendError::new(
                "permission-denied",
                format!("{} is outside {}", entry.storage_path, namespace),
            ));
        }

        let _write = self.write_lock.lock().await;
        let id = Uuid::new_v4().simple().to_string();
        self.state()
            .users
            .entry(uid.to_string())
            .or_default()
            .entries
            .push(StoredEntry {
                id: id.clone(),
                data: entry.to_document_data(Utc::now()),
            });

        if let Err(e) = self.persist().await {
            if let Some(docs) = self.state().users.get_mut(uid) {
                docs.entries.retain(|stored| stored.id != id);
            }
            return Err(e);
        }

        info!(entry_id = %id, "Entry appended");
        self.broadcast(uid);

        Ok(id)
    }

    #[instrument(skip(self, user), fields(uid = %user.uid))]
    async fn ensure_profile(&self, user: &User) -> Result<(), BackendError> {
        let _write = self.write_lock.lock().await;
        let now = Value::from(Utc::now().to_rfc3339());
        {
            let mut state = self.state();
            let docs = state.users.entry(user.uid.clone()).or_default();
            match docs.profile.as_mut().and_then(Value::as_object_mut) {
                Some(profile) => {
                    profile.insert("lastLoginAt".to_string(), now);
                }
                None => {
                    let mut profile = Map::new();
                    profile.insert("email".to_string(), json!(user.email));
                    profile.insert("displayName".to_string(), json!(user.display_name));
                    profile.insert("createdAt".to_string(), now.clone());
                    profile.insert("lastLoginAt".to_string(), now);
                    docs.profile = Some(Value::Object(profile));
                }
            }
        }

        self.persist().await
    }
}
