use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::{EncryptedField, FieldCodec};

/// What an untyped storage slot physically holds: usually a number or some text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawSlot {
    Number(f64),
    Text(String),
    Other(Value),
}

/// A quantity or cost-basis value with its representation made explicit.
///
/// On the wire this is exactly what the storage column holds (a JSON number or
/// a string); the variant is recovered by structural detection when a row is
/// read, so legacy plaintext rows need no migration flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSlot", into = "RawSlot")]
pub enum FieldValue {
    /// A plaintext number (legacy rows, or written while locked).
    Plain(f64),
    /// A `nonce:ciphertext` string produced by [`FieldCodec`].
    Encrypted(EncryptedField),
    /// Whatever else the slot held (unparseable text, null, a bool, an object).
    /// Kept as the original JSON value and written back unchanged.
    Invalid(Value),
}

impl FieldValue {
    /// Classify raw slot text. Anything containing the separator is treated as
    /// ciphertext; anything else is plaintext and never handed to the decryptor.
    pub fn detect(raw: &str) -> Self {
        if FieldCodec::is_encrypted(raw) {
            return match raw.parse::<EncryptedField>() {
                Ok(field) => FieldValue::Encrypted(field),
                Err(_) => FieldValue::Invalid(Value::String(raw.to_string())),
            };
        }

        match raw.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => FieldValue::Plain(n),
            _ => FieldValue::Invalid(Value::String(raw.to_string())),
        }
    }

    /// True when the slot holds (or looks like it holds) ciphertext.
    pub fn is_encrypted(&self) -> bool {
        match self {
            FieldValue::Plain(_) => false,
            FieldValue::Encrypted(_) => true,
            FieldValue::Invalid(raw) => raw.as_str().is_some_and(FieldCodec::is_encrypted),
        }
    }

    /// Placeholder for a slot missing from its row.
    pub fn missing() -> Self {
        FieldValue::Invalid(Value::Null)
    }

    /// True for plaintext numbers that could be sealed.
    pub fn is_plain(&self) -> bool {
        matches!(self, FieldValue::Plain(_))
    }
}

impl From<RawSlot> for FieldValue {
    fn from(raw: RawSlot) -> Self {
        match raw {
            RawSlot::Number(n) => FieldValue::Plain(n),
            RawSlot::Text(s) => FieldValue::detect(&s),
            RawSlot::Other(v) => FieldValue::Invalid(v),
        }
    }
}

impl From<FieldValue> for RawSlot {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Plain(n) => RawSlot::Number(n),
            FieldValue::Encrypted(field) => RawSlot::Text(field.to_string()),
            FieldValue::Invalid(raw) => RawSlot::Other(raw),
        }
    }
}

impl From<EncryptedField> for FieldValue {
    fn from(field: EncryptedField) -> Self {
        FieldValue::Encrypted(field)
    }
}
