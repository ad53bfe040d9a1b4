use aes_gcm::{aead::KeyInit, Aes256Gcm, Key};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::errors::CoreError;

use super::KEY_SIZE;

/// Iteration count used by the web client; changing it orphans every existing ciphertext.
pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 100_000;

/// Key-derivation algorithm and its cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum KdfParams {
    /// PBKDF2-HMAC-SHA256 with a fixed iteration count.
    Pbkdf2Sha256 { iterations: u32 },
    /// Argon2id (memory-hard). The salt string is hashed with SHA-256 first
    /// so short usernames still satisfy Argon2's minimum salt length.
    Argon2id {
        /// Memory cost in KiB
        memory_cost: u32,
        /// Number of passes
        time_cost: u32,
        /// Degree of parallelism
        parallelism: u32,
    },
}

impl Default for KdfParams {
    fn default() -> Self {
        KdfParams::Pbkdf2Sha256 {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KdfParams {
    /// Short algorithm name for logs.
    pub fn algorithm(&self) -> &'static str {
        match self {
            KdfParams::Pbkdf2Sha256 { .. } => "pbkdf2-sha256",
            KdfParams::Argon2id { .. } => "argon2id",
        }
    }
}

/// A 256-bit field-encryption key.
///
/// Exists only in memory for the lifetime of an unlocked session. There is no
/// accessor for the raw bytes and no serde impl; the bytes are zeroized on drop.
pub struct MasterKey {
    bytes: Zeroizing<[u8; KEY_SIZE]>,
}

impl MasterKey {
    pub(crate) fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.bytes[..]))
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Turns `(password, salt)` into a [`MasterKey`].
///
/// Derivation is deterministic: the same password, salt and parameters always
/// yield the same key, on any device. No state is persisted.
#[derive(Debug, Clone, Default)]
pub struct KeyDeriver {
    params: KdfParams,
}

impl KeyDeriver {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &KdfParams {
        &self.params
    }

    /// Derive the master key for `password` salted with `salt` (usually the username).
    pub fn derive(&self, password: &str, salt: &str) -> Result<MasterKey, CoreError> {
        if password.is_empty() {
            return Err(CoreError::InvalidInput("password must not be empty".into()));
        }
        if salt.is_empty() {
            return Err(CoreError::InvalidInput("salt must not be empty".into()));
        }

        let mut bytes = Zeroizing::new([0u8; KEY_SIZE]);

        match self.params {
            KdfParams::Pbkdf2Sha256 { iterations } => {
                if iterations == 0 {
                    return Err(CoreError::InvalidInput(
                        "PBKDF2 iteration count must be at least 1".into(),
                    ));
                }
                pbkdf2::pbkdf2_hmac::<Sha256>(
                    password.as_bytes(),
                    salt.as_bytes(),
                    iterations,
                    &mut bytes[..],
                );
            }
            KdfParams::Argon2id {
                memory_cost,
                time_cost,
                parallelism,
            } => {
                let argon2_params =
                    Params::new(memory_cost, time_cost, parallelism, Some(KEY_SIZE))
                        .map_err(|e| CoreError::InvalidInput(format!("Invalid Argon2 params: {e}")))?;
                let salt_digest = Sha256::digest(salt.as_bytes());

                Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params)
                    .hash_password_into(password.as_bytes(), salt_digest.as_slice(), &mut bytes[..])
                    .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;
            }
        }

        tracing::debug!(algorithm = self.params.algorithm(), "derived master key");
        Ok(MasterKey { bytes })
    }
}

/// Generate a random per-account salt (16 bytes, lowercase hex).
///
/// For deployments that persist a dedicated salt per account instead of
/// salting with the username.
pub fn generate_account_salt() -> Result<String, CoreError> {
    let mut salt = [0u8; 16];
    getrandom::getrandom(&mut salt)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random salt: {e}")))?;
    Ok(hex::encode(salt))
}
