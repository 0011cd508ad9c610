use crate::{AppError, config::Config};

use tempfile::TempDir;

/// WHAT: A saved config loads back unchanged
/// WHY: The remembered email must survive restarts
#[test]
#[allow(clippy::unwrap_used)]
fn given_saved_config_when_loading_then_identical() {
    // Given: A config with a remembered email
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    let mut config = Config::with_data_dir(dir.path().join("data"));
    config.account.remember_email = Some("ada@example.com".to_string());

    // When: Saving and loading
    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();

    // Then: Same values, no temp file left behind
    assert_eq!(loaded, config);
    assert!(!path.with_extension("toml.tmp").exists());
}

/// WHAT: The account section is optional
/// WHY: Hand-written configs only need the storage path
#[test]
#[allow(clippy::unwrap_used)]
fn given_config_without_account_when_loading_then_defaults_used() {
    // Given: Only a storage section
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[storage]\ndata_dir = \"/tmp/stars\"\n").unwrap();

    // When: Loading
    let loaded = Config::load_from(&path).unwrap();

    // Then: No remembered email
    assert_eq!(loaded.storage.data_dir, std::path::PathBuf::from("/tmp/stars"));
    assert_eq!(loaded.account.remember_email, None);
}

/// WHAT: Malformed TOML is a ConfigError
/// WHY: A broken file must be reported, not silently replaced
#[test]
#[allow(clippy::unwrap_used)]
fn given_malformed_file_when_loading_then_config_error() {
    // Given: Garbage in the config file
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "storage = [").unwrap();

    // When / Then: ConfigError
    assert!(matches!(
        Config::load_from(&path),
        Err(AppError::ConfigError { .. })
    ));
}

/// WHAT: Validation creates a missing data directory
/// WHY: First run starts with nothing on disk
#[test]
#[allow(clippy::unwrap_used)]
fn given_missing_data_dir_when_validating_then_created() {
    // Given: A data dir that doesn't exist yet
    let dir = TempDir::new().unwrap();
    let config = Config::with_data_dir(dir.path().join("nested").join("data"));

    // When: Validating
    config.validate_data_dir().unwrap();

    // Then: It exists
    assert!(config.storage.data_dir.is_dir());
}

/// WHAT: A data path pointing at a file is rejected
/// WHY: The backend needs a directory to write into
#[test]
#[allow(clippy::unwrap_used)]
fn given_data_path_is_file_when_validating_then_config_error() {
    // Given: A regular file where the directory should be
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("not-a-dir");
    std::fs::write(&file, b"").unwrap();
    let config = Config::with_data_dir(&file);

    // When / Then: ConfigError
    assert!(matches!(
        config.validate_data_dir(),
        Err(AppError::ConfigError { .. })
    ));
}
