use tokio::time::Instant;

/// An entry marked as just created, and when the mark fades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Highlight {
    pub(crate) entry_id: String,
    pub(crate) expires_at: Instant,
}

impl Highlight {
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
