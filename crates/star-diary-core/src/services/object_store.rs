use crate::BackendError;

use async_trait::async_trait;

/// Binary object storage addressed by locator.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `locator`.
    async fn upload(
        &self,
        locator: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError>;

    /// Turn a locator into a URL the audio output can load.
    async fn resolve(&self, locator: &str) -> Result<String, BackendError>;
}
