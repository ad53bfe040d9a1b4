use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder shown for any field that cannot be read.
pub const LOCKED_PLACEHOLDER: &str = "LOCKED";

/// Why a field could not be read. Diagnostics only: every reason renders the
/// same placeholder so the UI never reveals wrong-key versus corrupted data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockReason {
    /// Ciphertext present but the session holds no key.
    NoKey,
    /// The slot held text that is not a well-formed field.
    Malformed,
    /// The tag did not verify, most likely a different password.
    AuthenticationFailure,
    /// Decryption succeeded but the plaintext was not a number.
    Corrupted,
}

impl std::fmt::Display for LockReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockReason::NoKey => write!(f, "no key"),
            LockReason::Malformed => write!(f, "malformed field"),
            LockReason::AuthenticationFailure => write!(f, "authentication failure"),
            LockReason::Corrupted => write!(f, "corrupted plaintext"),
        }
    }
}

/// Outcome of reading one numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FieldReading {
    /// Stored as plaintext.
    Plain(f64),
    /// Stored encrypted and decrypted with the session key.
    Decrypted(f64),
    /// Not readable; render the placeholder.
    Locked(LockReason),
}

impl FieldReading {
    pub fn value(&self) -> Option<f64> {
        match self {
            FieldReading::Plain(v) | FieldReading::Decrypted(v) => Some(*v),
            FieldReading::Locked(_) => None,
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, FieldReading::Locked(_))
    }

    /// User-facing text for this field, in the number's JSON form (`42.0`, `12.5`).
    pub fn display(&self) -> String {
        match self.value() {
            Some(v) => serde_json::Number::from_f64(v)
                .map(|n| n.to_string())
                .unwrap_or_else(|| v.to_string()),
            None => LOCKED_PLACEHOLDER.to_string(),
        }
    }
}

/// One asset as the user sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionView {
    pub asset_id: Uuid,
    pub symbol: String,
    pub quantity: FieldReading,
    pub cost_basis: FieldReading,
    /// Whether the stored quantity is ciphertext (drives the lock badge).
    pub encrypted: bool,
}

impl PositionView {
    /// quantity × cost basis, when both are readable.
    pub fn total_cost(&self) -> Option<f64> {
        Some(self.quantity.value()? * self.cost_basis.value()?)
    }
}

/// A portfolio with every readable field resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioView {
    pub portfolio_id: Uuid,
    pub name: String,
    pub currency: String,
    pub positions: Vec<PositionView>,

    /// Sum of `total_cost` over positions whose fields are all readable.
    pub total_cost: f64,

    /// Positions with at least one locked field (excluded from `total_cost`).
    pub locked_count: usize,
}

impl PortfolioView {
    /// True when every field of every position could be read.
    pub fn is_complete(&self) -> bool {
        self.locked_count == 0
    }
}
