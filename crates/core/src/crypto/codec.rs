use aes_gcm::{aead::Aead, Nonce};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::errors::CoreError;

use super::kdf::MasterKey;
use super::{NONCE_SIZE, TAG_SIZE};

/// Joins the nonce and ciphertext halves. Never appears in a serialized number.
pub const SEPARATOR: char = ':';

/// One encrypted scalar, as stored: `hex(nonce) ":" hex(ciphertext ‖ tag)`.
///
/// Holds the decoded bytes; [`Display`](std::fmt::Display) renders the
/// lowercase-hex wire form and [`FromStr`](std::str::FromStr) validates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncryptedField {
    nonce: [u8; NONCE_SIZE],
    ciphertext: Vec<u8>,
}

impl EncryptedField {
    /// Build a field from raw parts. The ciphertext must at least hold the tag.
    pub fn from_parts(nonce: [u8; NONCE_SIZE], ciphertext: Vec<u8>) -> Result<Self, CoreError> {
        if ciphertext.len() < TAG_SIZE {
            return Err(CoreError::MalformedField(format!(
                "ciphertext too short: {} bytes, need at least {TAG_SIZE}",
                ciphertext.len()
            )));
        }
        Ok(Self { nonce, ciphertext })
    }

    pub fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    /// Ciphertext with the 16-byte authentication tag appended.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

impl std::fmt::Display for EncryptedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}",
            hex::encode(self.nonce),
            hex::encode(&self.ciphertext)
        )
    }
}

impl std::str::FromStr for EncryptedField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (nonce_hex, ciphertext_hex) = s
            .split_once(SEPARATOR)
            .ok_or_else(|| CoreError::MalformedField("missing separator".into()))?;

        if nonce_hex.is_empty() || ciphertext_hex.is_empty() {
            return Err(CoreError::MalformedField(
                "nonce and ciphertext must both be non-empty".into(),
            ));
        }

        // A second separator lands in the ciphertext half and fails hex decoding.
        let nonce_bytes = hex::decode(nonce_hex)?;
        let nonce: [u8; NONCE_SIZE] = nonce_bytes.as_slice().try_into().map_err(|_| {
            CoreError::MalformedField(format!(
                "nonce must be {NONCE_SIZE} bytes, got {}",
                nonce_bytes.len()
            ))
        })?;
        let ciphertext = hex::decode(ciphertext_hex)?;

        Self::from_parts(nonce, ciphertext)
    }
}

impl TryFrom<String> for EncryptedField {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<EncryptedField> for String {
    fn from(field: EncryptedField) -> Self {
        field.to_string()
    }
}

/// Encrypts and decrypts individual scalar values with a [`MasterKey`].
///
/// Stateless; every call is independent and may run concurrently with others.
pub struct FieldCodec;

impl FieldCodec {
    /// Encrypt any JSON-serializable value.
    ///
    /// Flow: value → serde_json text → AES-256-GCM(key, fresh random nonce) → [`EncryptedField`]
    pub fn encrypt<T: Serialize + ?Sized>(
        value: &T,
        key: &MasterKey,
    ) -> Result<EncryptedField, CoreError> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(value)
                .map_err(|e| CoreError::Serialization(format!("Failed to serialize field: {e}")))?,
        );
        let nonce = generate_nonce()?;

        let ciphertext = key
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|e| CoreError::Encryption(format!("AES-GCM encryption failed: {e}")))?;

        Ok(EncryptedField { nonce, ciphertext })
    }

    /// Encrypt a numeric amount. JSON cannot represent NaN or infinities, so they are rejected.
    pub fn encrypt_amount(amount: f64, key: &MasterKey) -> Result<EncryptedField, CoreError> {
        if !amount.is_finite() {
            return Err(CoreError::InvalidInput(format!(
                "cannot encrypt non-finite amount {amount}"
            )));
        }
        Self::encrypt(&amount, key)
    }

    /// Decrypt a field back into `T`.
    ///
    /// Returns `AuthenticationFailure` when the tag does not verify (wrong key or
    /// tampering) and `Deserialization` when the plaintext is not valid JSON for `T`.
    pub fn decrypt<T: DeserializeOwned>(field: &EncryptedField, key: &MasterKey) -> Result<T, CoreError> {
        let plaintext = Zeroizing::new(
            key.cipher()
                .decrypt(Nonce::from_slice(&field.nonce), field.ciphertext.as_slice())?,
        );

        serde_json::from_slice(plaintext.as_slice())
            .map_err(|e| CoreError::Deserialization(format!("Decrypted field is not valid JSON: {e}")))
    }

    /// Parse the wire form, then decrypt. Structural problems yield `MalformedField`.
    pub fn decrypt_str<T: DeserializeOwned>(field: &str, key: &MasterKey) -> Result<T, CoreError> {
        let field: EncryptedField = field.parse()?;
        Self::decrypt(&field, key)
    }

    /// Structural detection: does this stored text look like ciphertext?
    pub fn is_encrypted(raw: &str) -> bool {
        raw.contains(SEPARATOR)
    }
}

/// Fresh random 96-bit nonce. Must never repeat under one key.
fn generate_nonce() -> Result<[u8; NONCE_SIZE], CoreError> {
    let mut nonce = [0u8; NONCE_SIZE];
    getrandom::getrandom(&mut nonce)
        .map_err(|e| CoreError::Encryption(format!("Failed to generate random nonce: {e}")))?;
    Ok(nonce)
}
