use crate::backend::LocalObjects;

use star_diary_core::ObjectStore;
use tempfile::TempDir;

/// WHAT: Uploaded bytes resolve to a file URL with the same content
/// WHY: The player loads clips straight from the resolved URL
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_upload_when_resolving_then_file_url_to_bytes() {
    // Given: An uploaded clip
    let dir = TempDir::new().unwrap();
    let objects = LocalObjects::new(dir.path().join("objects"));
    objects
        .upload("entries/ada/clip.wav", vec![1, 2, 3], "audio/wav")
        .await
        .unwrap();

    // When: Resolving it
    let url = objects.resolve("entries/ada/clip.wav").await.unwrap();

    // Then: The URL points at the stored bytes
    let path = url.strip_prefix("file://").unwrap();
    assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
}

/// WHAT: Resolving a missing object reports object-not-found
/// WHY: The player turns that code into a readable message
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_missing_object_when_resolving_then_not_found() {
    let dir = TempDir::new().unwrap();
    let objects = LocalObjects::new(dir.path().to_path_buf());

    let err = objects.resolve("entries/ada/nope.wav").await.unwrap_err();

    assert_eq!(err.code, "storage/object-not-found");
}

/// WHAT: Locators cannot escape the object root
/// WHY: A crafted document must not read or overwrite arbitrary files
#[test]
fn given_escaping_locators_when_mapping_then_rejected() {
    let objects = LocalObjects::new(std::path::PathBuf::from("/data/objects"));

    for locator in ["", "../secret", "entries/../../etc/passwd", "/etc/passwd", "./a"] {
        let result = objects.object_path(locator);
        assert!(
            matches!(&result, Err(e) if e.code == "storage/invalid-argument"),
            "{:?} should be rejected",
            locator
        );
    }

    assert!(objects.object_path("entries/ada/clip.wav").is_ok());
}
