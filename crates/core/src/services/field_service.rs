use tracing::{debug, error, warn};

use crate::crypto::{FieldCodec, MasterKey};
use crate::errors::CoreError;
use crate::models::field::FieldValue;
use crate::models::settings::WritePolicy;
use crate::models::view::{FieldReading, LockReason};

/// The write/read protocol for quantity and cost-basis fields.
///
/// Write: seal with the session key when one is held, otherwise apply the
/// [`WritePolicy`]. Read: plaintext passes through untouched; ciphertext is
/// decrypted with the held key; every failure becomes a locked reading.
/// Nothing here is retried: decryption is deterministic.
pub struct FieldService {
    policy: WritePolicy,
}

impl FieldService {
    pub fn new(policy: WritePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Prepare an amount for storage.
    pub fn seal(&self, amount: f64, key: Option<&MasterKey>) -> Result<FieldValue, CoreError> {
        if !amount.is_finite() {
            return Err(CoreError::ValidationError(format!(
                "amount must be a finite number, got {amount}"
            )));
        }

        match (key, self.policy) {
            (Some(key), _) => Ok(FieldValue::Encrypted(FieldCodec::encrypt_amount(amount, key)?)),
            (None, WritePolicy::PlaintextFallback) => {
                warn!("no key held; storing field as plaintext");
                Ok(FieldValue::Plain(amount))
            }
            (None, WritePolicy::RequireKey) => Err(CoreError::Locked),
        }
    }

    /// Resolve a stored field for display. Never fails.
    pub fn open(&self, value: &FieldValue, key: Option<&MasterKey>) -> FieldReading {
        let field = match value {
            FieldValue::Plain(n) => return FieldReading::Plain(*n),
            FieldValue::Invalid(raw) => {
                warn!(null = raw.is_null(), "stored field is neither a number nor a valid ciphertext");
                return FieldReading::Locked(LockReason::Malformed);
            }
            FieldValue::Encrypted(field) => field,
        };

        let Some(key) = key else {
            debug!("encrypted field read while locked");
            return FieldReading::Locked(LockReason::NoKey);
        };

        match FieldCodec::decrypt::<f64>(field, key) {
            Ok(v) => FieldReading::Decrypted(v),
            Err(CoreError::AuthenticationFailure) => {
                warn!("field failed authentication; wrong key or tampered ciphertext");
                FieldReading::Locked(LockReason::AuthenticationFailure)
            }
            Err(CoreError::MalformedField(reason)) => {
                warn!(%reason, "malformed encrypted field");
                FieldReading::Locked(LockReason::Malformed)
            }
            Err(e) => {
                error!(error = %e, "field decrypted but its plaintext is corrupt");
                FieldReading::Locked(LockReason::Corrupted)
            }
        }
    }

    /// Re-seal a plaintext field under `key`. Returns `None` when there is nothing to do.
    pub fn reseal(&self, value: &FieldValue, key: &MasterKey) -> Result<Option<FieldValue>, CoreError> {
        match value {
            FieldValue::Plain(n) => Ok(Some(FieldValue::Encrypted(FieldCodec::encrypt_amount(*n, key)?))),
            FieldValue::Encrypted(_) | FieldValue::Invalid(_) => Ok(None),
        }
    }
}

impl Default for FieldService {
    fn default() -> Self {
        Self::new(WritePolicy::default())
    }
}

/// Parse a user-typed amount ("12.5", " 3 ", "1e3").
pub fn parse_amount(input: &str) -> Result<f64, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::ValidationError("amount must not be empty".into()));
    }
    let amount: f64 = trimmed
        .parse()
        .map_err(|_| CoreError::ValidationError(format!("not a number: {trimmed:?}")))?;
    if !amount.is_finite() {
        return Err(CoreError::ValidationError(format!(
            "amount must be a finite number, got {trimmed:?}"
        )));
    }
    Ok(amount)
}
