mod account_config;
#[allow(clippy::module_inception)]
mod config;
mod storage_config;

pub(crate) use {account_config::AccountConfig, config::Config, storage_config::StorageConfig};

pub(crate) const QUALIFIER: &str = "com";
pub(crate) const ORGANIZATION: &str = "star-diary";
pub(crate) const APPLICATION: &str = "Star-Diary";
