//! Live entry list and the "new star" highlight.

use crate::{
    DocumentStore, Entry, EntryDocument, Services, Subscription, User, feed::highlight::Highlight,
};

use std::{future, sync::Arc, time::Duration};

use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// How long a freshly created star stays highlighted.
pub const HIGHLIGHT_DWELL: Duration = Duration::from_millis(3600);

/// Keeps the rendered entries in step with the store.
///
/// Each snapshot replaces the whole list. An id announced through
/// [`FeedController::entry_created`] is highlighted as soon as it shows up
/// in the list, and the highlight fades after [`HIGHLIGHT_DWELL`].
pub struct FeedController {
    documents: Arc<dyn DocumentStore>,
    uid: Option<String>,
    subscription: Option<Subscription<Vec<EntryDocument>>>,
    entries: Vec<Entry>,
    pending: Option<String>,
    highlight: Option<Highlight>,
    /// Set on attach until the first snapshot lands.
    awaiting_first: bool,
}

impl FeedController {
    /// Create a detached controller with no entries.
    pub fn new(services: &Services) -> Self {
        Self {
            documents: Arc::clone(&services.documents),
            uid: None,
            subscription: None,
            entries: Vec::new(),
            pending: None,
            highlight: None,
            awaiting_first: false,
        }
    }

    /// Follow the entries of `user`, or clear everything when signed out.
    ///
    /// Re-attaching the same user keeps the existing subscription.
    #[instrument(skip_all)]
    pub fn attach(&mut self, user: Option<&User>) {
        let uid = user.map(|u| u.uid.clone());
        if uid == self.uid && (uid.is_none() || self.subscription.is_some()) {
            return;
        }

        self.detach();

        if let Some(uid) = uid {
            self.subscription = Some(self.documents.subscribe_entries(&uid));
            info!(uid = %uid, "Subscribed to entries");
            self.uid = Some(uid);
            self.awaiting_first = true;
        }
    }

    /// Drop the live subscription and forget the current list.
    pub fn detach(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.uid = None;
        self.entries.clear();
        self.pending = None;
        self.highlight = None;
        self.awaiting_first = false;
    }

    /// Wait for the next snapshot.
    ///
    /// Never resolves while detached. Cancel safe.
    pub async fn next_snapshot(&mut self) -> Option<Vec<EntryDocument>> {
        let Some(subscription) = self.subscription.as_mut() else {
            return future::pending().await;
        };

        let snapshot = subscription.next().await;
        if snapshot.is_none() {
            debug!("Entry feed closed by the store");
            self.subscription = None;
        }
        snapshot
    }

    /// Replace the rendered list with a new snapshot.
    ///
    /// Documents without a usable locator are skipped. Returns true when the
    /// sky should be redrawn: the first snapshot after attaching, or one that
    /// brought a new highlight.
    #[instrument(skip(self, documents), fields(document_count = documents.len()))]
    pub fn apply_snapshot(&mut self, documents: Vec<EntryDocument>) -> bool {
        let first = std::mem::take(&mut self.awaiting_first);
        let previous = self.highlighted_id().map(str::to_string);

        self.entries = documents.iter().filter_map(Entry::from_document).collect();

        let skipped = documents.len() - self.entries.len();
        if skipped > 0 {
            debug!(skipped, "Skipped documents without a locator");
        }

        self.promote_pending();

        let highlighted = self.highlighted_id();
        first || (highlighted.is_some() && highlighted != previous.as_deref())
    }

    /// Announce a newly created entry so it gets highlighted.
    ///
    /// Any current highlight ends immediately.
    pub fn entry_created(&mut self, entry_id: String) {
        debug!(entry_id = %entry_id, "Highlight pending");
        self.highlight = None;
        self.pending = Some(entry_id);
        self.promote_pending();
    }

    /// When the current highlight should be cleared.
    pub fn highlight_deadline(&self) -> Option<Instant> {
        self.highlight.as_ref().map(|h| h.expires_at)
    }

    /// Clear the highlight if its dwell time has passed.
    ///
    /// Returns true when something was cleared.
    pub fn expire_highlight(&mut self) -> bool {
        let now = Instant::now();
        match &self.highlight {
            Some(highlight) if highlight.is_expired(now) => {
                debug!(entry_id = %highlight.entry_id, "Highlight cleared");
                self.highlight = None;
                true
            }
            _ => false,
        }
    }

    /// Entries in creation order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Look up a rendered entry.
    pub fn entry(&self, entry_id: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.id == entry_id)
    }

    /// Entry currently highlighted.
    pub fn highlighted_id(&self) -> Option<&str> {
        self.highlight.as_ref().map(|h| h.entry_id.as_str())
    }

    /// Entry announced but not yet seen in a snapshot.
    pub fn pending_id(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// True while following a user's entries.
    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    fn promote_pending(&mut self) {
        let Some(pending) = self.pending.as_deref() else {
            return;
        };
        if self.entry(pending).is_none() {
            return;
        }

        if let Some(entry_id) = self.pending.take() {
            debug!(entry_id = %entry_id, "Highlighting new star");
            self.highlight = Some(Highlight {
                entry_id,
                expires_at: Instant::now() + HIGHLIGHT_DWELL,
            });
        }
    }
}

impl Drop for FeedController {
    fn drop(&mut self) {
        self.detach();
    }
}
