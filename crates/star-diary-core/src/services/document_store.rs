use crate::{BackendError, EntryDocument, NewEntry, Subscription, User};

use async_trait::async_trait;

/// Per-user document collections.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Live view of a user's entries, ordered by creation time ascending.
    ///
    /// The first message is the current snapshot; every later message is a
    /// complete replacement, delivered in the order the store produced them.
    fn subscribe_entries(&self, uid: &str) -> Subscription<Vec<EntryDocument>>;

    /// Append an entry, letting the store stamp its creation time.
    ///
    /// Returns the id assigned to the new document.
    async fn append_entry(&self, uid: &str, entry: NewEntry) -> Result<String, BackendError>;

    /// Create the user's profile document, or refresh its last-login time.
    async fn ensure_profile(&self, user: &User) -> Result<(), BackendError>;
}
