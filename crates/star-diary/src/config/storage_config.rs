use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where the local backend keeps its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root for accounts, entry documents and audio objects.
    pub data_dir: PathBuf,
}
