//! Client-side field encryption.
//!
//! ```text
//! (password, salt) ──KeyDeriver──▶ MasterKey (session memory only)
//! value ──serde_json──▶ AES-256-GCM(MasterKey, random 96-bit nonce) ──▶ "nonce_hex:ciphertext_hex"
//! ```

pub mod codec;
pub mod kdf;

pub use codec::{EncryptedField, FieldCodec, SEPARATOR};
pub use kdf::{generate_account_salt, KdfParams, KeyDeriver, MasterKey};

/// Size of a master key in bytes (256-bit).
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM nonce in bytes (96-bit).
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag appended to every ciphertext.
pub const TAG_SIZE: usize = 16;
