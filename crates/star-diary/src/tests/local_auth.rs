use crate::backend::LocalAuth;

use star_diary_core::AuthService;
use tempfile::TempDir;

#[allow(clippy::unwrap_used)]
async fn open(dir: &TempDir) -> LocalAuth {
    LocalAuth::open(dir.path().join("accounts.json")).await.unwrap()
}

/// WHAT: Sign-up creates an account and signs it in
/// WHY: A new user should land in their sky without a second step
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_new_email_when_signing_up_then_signed_in() {
    // Given: An empty account store
    let dir = TempDir::new().unwrap();
    let auth = open(&dir).await;
    let mut session = auth.subscribe();

    // When: Signing up with mixed-case email
    let user = auth.sign_up(" Ada@Example.com ", "hunter22").await.unwrap();

    // Then: Normalized email, current user set, subscribers notified
    assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    assert_eq!(auth.current_user(), Some(user.clone()));
    session.changed().await.unwrap();
    assert_eq!(*session.borrow(), Some(user));
}

/// WHAT: Sign-up rules reject bad input with provider codes
/// WHY: Codes drive the friendly error text
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_bad_sign_up_when_submitting_then_error_codes() {
    // Given: One existing account
    let dir = TempDir::new().unwrap();
    let auth = open(&dir).await;
    auth.sign_up("ada@example.com", "hunter22").await.unwrap();

    // When / Then: Each rule has its code
    let weak = auth.sign_up("bob@example.com", "12345").await.unwrap_err();
    assert_eq!(weak.code, "auth/weak-password");

    let invalid = auth.sign_up("not-an-email", "hunter22").await.unwrap_err();
    assert_eq!(invalid.code, "auth/invalid-email");

    let taken = auth.sign_up("ADA@example.com", "hunter22").await.unwrap_err();
    assert_eq!(taken.code, "auth/email-already-in-use");
}

/// WHAT: Sign-in checks the password against the stored hash
/// WHY: Wrong passwords and unknown emails must be distinguishable
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_account_when_signing_in_then_password_checked() {
    // Given: An account, signed out
    let dir = TempDir::new().unwrap();
    let auth = open(&dir).await;
    let created = auth.sign_up("ada@example.com", "hunter22").await.unwrap();
    auth.sign_out().await.unwrap();
    assert_eq!(auth.current_user(), None);

    // When / Then: Wrong password and unknown email fail
    let wrong = auth.sign_in("ada@example.com", "hunter23").await.unwrap_err();
    assert_eq!(wrong.code, "auth/wrong-password");
    let unknown = auth.sign_in("bob@example.com", "hunter22").await.unwrap_err();
    assert_eq!(unknown.code, "auth/user-not-found");
    assert_eq!(auth.current_user(), None);

    // When / Then: The right password restores the same uid
    let user = auth.sign_in("ada@example.com", "hunter22").await.unwrap();
    assert_eq!(user.uid, created.uid);
}

/// WHAT: Accounts survive reopening the store
/// WHY: Users come back to the same sky after a restart
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_saved_account_when_reopening_then_sign_in_works() {
    // Given: An account written by a previous run
    let dir = TempDir::new().unwrap();
    let created = open(&dir)
        .await
        .sign_up("ada@example.com", "hunter22")
        .await
        .unwrap();

    // When: Reopening
    let auth = open(&dir).await;

    // Then: Nobody is signed in, but the account exists
    assert_eq!(auth.current_user(), None);
    let user = auth.sign_in("ada@example.com", "hunter22").await.unwrap();
    assert_eq!(user.uid, created.uid);

    // And: The password itself is not stored
    let raw = std::fs::read_to_string(dir.path().join("accounts.json")).unwrap();
    assert!(!raw.contains("hunter22"));
}

/// WHAT: A corrupt accounts file fails to open
/// WHY: Silently starting empty would orphan every existing sky
#[tokio::test]
#[allow(clippy::unwrap_used)]
async fn given_corrupt_file_when_opening_then_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("accounts.json");
    std::fs::write(&path, b"{ not json").unwrap();

    assert!(LocalAuth::open(path).await.is_err());
}
