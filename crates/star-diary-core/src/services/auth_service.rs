use crate::BackendError;

use async_trait::async_trait;
use tokio::sync::watch;

/// Signed-in user identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable user id; scopes entries and stored objects.
    pub uid: String,
    /// Account email, when the provider exposes one.
    pub email: Option<String>,
    /// Display name, when set.
    pub display_name: Option<String>,
}

/// Email/password authentication provider.
///
/// Failures carry a machine-readable code such as `auth/invalid-email`.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// The user of the current session, if any.
    fn current_user(&self) -> Option<User>;

    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, BackendError>;

    /// Sign in to an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// Stream of session changes; the current value is the signed-in user.
    fn subscribe(&self) -> watch::Receiver<Option<User>>;
}
