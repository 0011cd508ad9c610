//! Audio objects as plain files.

use crate::backend::write_atomic;

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use star_diary_core::{BackendError, ObjectStore};
use tracing::{debug, instrument};

/// Local stand-in for a hosted object store.
///
/// A locator maps to a file under the root; resolved URLs use `file://`.
pub(crate) struct LocalObjects {
    root: PathBuf,
}

impl LocalObjects {
    pub(crate) fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// File backing `locator`. Locators must be relative and stay inside the root.
    pub(crate) fn object_path(&self, locator: &str) -> Result<PathBuf, BackendError> {
        let relative = Path::new(locator);
        let contained = !locator.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));

        if !contained {
            return Err(BackendError::new(
                "storage/invalid-argument",
                format!("Invalid object locator: {}", locator),
            ));
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjects {
    #[instrument(skip(self, bytes, content_type), fields(byte_len = bytes.len()))]
    async fn upload(
        &self,
        locator: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let path = self.object_path(locator)?;
        write_atomic(&path, &bytes).await?;
        debug!(path = ?path, content_type = %content_type, "Object stored");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn resolve(&self, locator: &str) -> Result<String, BackendError> {
        let path = self.object_path(locator)?;

        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| BackendError::new("storage/unknown", e.to_string()))?;
        if !exists {
            return Err(BackendError::new(
                "storage/object-not-found",
                format!("No object at {}", locator),
            ));
        }

        Ok(format!("file://{}", path.display()))
    }
}
