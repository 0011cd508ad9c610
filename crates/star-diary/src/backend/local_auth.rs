//! Email/password accounts stored in a JSON file.

use crate::{AppError, AppResult, backend::write_json_atomic};

use std::{panic::Location, path::PathBuf};

use async_trait::async_trait;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use star_diary_core::{AuthService, BackendError, User};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Shortest password accepted at sign-up.
pub(crate) const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountFile {
    accounts: Vec<Account>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    uid: String,
    email: String,
    salt: String,
    password_hash: String,
}

impl Account {
    fn user(&self) -> User {
        User {
            uid: self.uid.clone(),
            email: Some(self.email.clone()),
            display_name: None,
        }
    }
}

/// Local stand-in for a hosted auth provider.
///
/// Sessions are in-memory only; every run starts signed out.
pub(crate) struct LocalAuth {
    path: PathBuf,
    accounts: Mutex<AccountFile>,
    user: watch::Sender<Option<User>>,
}

impl LocalAuth {
    /// Load accounts from `path`; a missing file means no accounts yet.
    pub(crate) async fn open(path: PathBuf) -> AppResult<Self> {
        let location = Location::caller();

        let accounts = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| AppError::ConfigError {
                reason: format!("Corrupt accounts file {:?}: {}", path, e),
                location: ErrorLocation::from(location),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AccountFile::default(),
            Err(e) => {
                return Err(AppError::IoError {
                    source: e,
                    location: ErrorLocation::from(location),
                });
            }
        };

        let (user, _) = watch::channel(None);

        Ok(Self {
            path,
            accounts: Mutex::new(accounts),
            user,
        })
    }
}

#[async_trait]
impl AuthService for LocalAuth {
    fn current_user(&self) -> Option<User> {
        self.user.borrow().clone()
    }

    #[instrument(skip(self, password))]
    async fn sign_up(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(BackendError::new(
                "auth/weak-password",
                format!("Password should be at least {} characters", MIN_PASSWORD_CHARS),
            ));
        }

        let mut file = self.accounts.lock().await;
        if file.accounts.iter().any(|a| a.email == email) {
            return Err(BackendError::new(
                "auth/email-already-in-use",
                "The email address is already in use by another account.",
            ));
        }

        let salt = Uuid::new_v4().simple().to_string();
        let account = Account {
            uid: Uuid::new_v4().simple().to_string(),
            password_hash: hash_password(&salt, password),
            salt,
            email,
        };

        file.accounts.push(account.clone());
        if let Err(e) = write_json_atomic(&self.path, &*file).await {
            file.accounts.pop();
            return Err(e);
        }
        drop(file);

        let user = account.user();
        self.user.send_replace(Some(user.clone()));
        info!(uid = %user.uid, "Account created");

        Ok(user)
    }

    #[instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, BackendError> {
        let email = normalize_email(email)?;

        let file = self.accounts.lock().await;
        let account = file
            .accounts
            .iter()
            .find(|a| a.email == email)
            .ok_or_else(|| BackendError::new("auth/user-not-found", "No account for this email."))?;

        if hash_password(&account.salt, password) != account.password_hash {
            debug!(uid = %account.uid, "Password mismatch");
            return Err(BackendError::new("auth/wrong-password", "The password is invalid."));
        }

        let user = account.user();
        drop(file);

        self.user.send_replace(Some(user.clone()));
        info!(uid = %user.uid, "Signed in");

        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.user.send_replace(None);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }
}

/// Lowercase and trim an email, rejecting anything without a plausible
/// `local@domain.tld` shape.
pub(crate) fn normalize_email(email: &str) -> Result<String, BackendError> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(BackendError::new(
            "auth/invalid-email",
            "The email address is badly formatted.",
        ))
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let digest = Sha256::new()
        .chain_update(salt.as_bytes())
        .chain_update(password.as_bytes())
        .finalize();
    digest.iter().map(|byte| format!("{:02x}", byte)).collect()
}
