use crate::crypto::{KeyDeriver, MasterKey};
use crate::errors::CoreError;

/// Per-user session state: who is logged in and, once unlocked, their key.
///
/// The key is passed explicitly into every seal/open call via [`Session::key`].
/// Dropping the session (or calling [`Session::lock`]) zeroizes it.
#[derive(Debug)]
pub struct Session {
    username: String,
    salt: Option<String>,
    key: Option<MasterKey>,
}

impl Session {
    /// A logged-in but locked session. The username doubles as the KDF salt.
    pub fn locked(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            salt: None,
            key: None,
        }
    }

    /// A locked session that salts with a dedicated per-account salt instead of the username.
    pub fn with_account_salt(username: impl Into<String>, salt: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            salt: Some(salt.into()),
            key: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The string fed to the KDF as salt.
    pub fn salt(&self) -> &str {
        self.salt.as_deref().unwrap_or(&self.username)
    }

    /// Derive the key from `password` and hold it. Replaces any previous key.
    pub fn unlock(&mut self, deriver: &KeyDeriver, password: &str) -> Result<(), CoreError> {
        let key = deriver.derive(password, self.salt())?;
        self.key = Some(key);
        tracing::debug!(user = %self.username, "session unlocked");
        Ok(())
    }

    /// Drop the key. Already-stored ciphertext becomes unreadable until the next unlock.
    pub fn lock(&mut self) {
        if self.key.take().is_some() {
            tracing::debug!(user = %self.username, "session locked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.key.is_some()
    }

    pub fn key(&self) -> Option<&MasterKey> {
        self.key.as_ref()
    }
}
