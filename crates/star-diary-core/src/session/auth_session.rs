//! Sign-up, sign-in and profile upkeep.

use crate::{AuthService, BackendError, DocumentStore, Services, User};

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, instrument, warn};

/// Authentication front for the application.
///
/// Every successful sign-up or sign-in also creates or refreshes the
/// user's profile document.
#[derive(Clone)]
pub struct AuthSession {
    auth: Arc<dyn AuthService>,
    documents: Arc<dyn DocumentStore>,
}

impl AuthSession {
    /// Wrap the auth and document collaborators.
    pub fn new(services: &Services) -> Self {
        Self {
            auth: Arc::clone(&services.auth),
            documents: Arc::clone(&services.documents),
        }
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.auth.current_user()
    }

    /// Session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.auth.subscribe()
    }

    /// Create an account, sign it in and write its profile.
    ///
    /// # Errors
    ///
    /// The provider's error, code intact. Map it with [`auth_error_message`].
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let user = self.auth.sign_up(email, password).await?;
        self.documents.ensure_profile(&user).await?;
        info!(uid = %user.uid, "Account created");
        Ok(user)
    }

    /// Sign in and refresh the profile's last-login time.
    ///
    /// # Errors
    ///
    /// The provider's error, code intact. Map it with [`auth_error_message`].
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let user = self.auth.sign_in(email, password).await?;
        self.documents.ensure_profile(&user).await?;
        info!(uid = %user.uid, "Signed in");
        Ok(user)
    }

    /// End the session.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> Result<(), BackendError> {
        self.auth.sign_out().await?;
        info!("Signed out");
        Ok(())
    }

    /// Profile upkeep for a session that appeared without an explicit
    /// sign-in (for example one restored at startup). Failures are logged.
    #[instrument(skip(self, user), fields(uid = %user.uid))]
    pub async fn refresh_profile(&self, user: &User) {
        if let Err(e) = self.documents.ensure_profile(user).await {
            warn!(error = ?e, "Failed to ensure user profile");
        }
    }
}

/// User-facing text for an authentication failure.
///
/// Known provider codes get a fixed message; anything else falls back to
/// the provider's own text.
pub fn auth_error_message(error: &BackendError) -> String {
    let known = match error.code.as_str() {
        "auth/email-already-in-use" => Some("That email is already in use."),
        "auth/invalid-email" => Some("That doesn't look like a valid email address."),
        "auth/weak-password" => Some("Passwords need at least 6 characters."),
        "auth/user-not-found" | "auth/wrong-password" | "auth/invalid-credential" => {
            Some("Email or password is incorrect.")
        }
        _ => None,
    };

    match known {
        Some(message) => message.to_string(),
        None if error.message.is_empty() => "Authentication failed.".to_string(),
        None => error.message.clone(),
    }
}
