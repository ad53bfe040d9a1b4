use thiserror::Error;

/// Errors raised by key derivation, the field codec, sessions and the store.
///
/// Codec failures on the read path never reach callers of the façade; they
/// become locked readings instead.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Key derivation / codec ──────────────────────────────────────
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Malformed encrypted field: {0}")]
    MalformedField(String),

    #[error("Authentication failed — wrong key or tampered field")]
    AuthenticationFailure,

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── Session ─────────────────────────────────────────────────────
    #[error("Session is locked — unlock to write encrypted fields")]
    Locked,

    #[error("No user is logged in")]
    NotLoggedIn,

    // ── Storage ─────────────────────────────────────────────────────
    #[error("Portfolio not found: {0}")]
    PortfolioNotFound(String),

    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

// ── Library error conversions ───────────────────────────────────────

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<hex::FromHexError> for CoreError {
    fn from(e: hex::FromHexError) -> Self {
        CoreError::MalformedField(e.to_string())
    }
}

impl From<aes_gcm::Error> for CoreError {
    fn from(_: aes_gcm::Error) -> Self {
        CoreError::AuthenticationFailure
    }
}
