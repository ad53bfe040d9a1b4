use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::field::FieldValue;

/// One position in a portfolio, exactly as the store holds it.
///
/// `symbol` is always plaintext. `quantity` and `cost_basis` may each be a
/// plain number or an encrypted field, independently of each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier
    pub id: Uuid,

    /// Owning portfolio
    pub portfolio_id: Uuid,

    /// Ticker symbol, uppercased (e.g., "BTC", "AAPL")
    #[serde(default)]
    pub symbol: String,

    /// Units held
    #[serde(default = "FieldValue::missing")]
    pub quantity: FieldValue,

    /// Average cost per unit
    #[serde(default = "FieldValue::missing")]
    pub cost_basis: FieldValue,

    /// When the position was first stored
    #[serde(default, deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl Asset {
    pub fn new(
        portfolio_id: Uuid,
        symbol: impl Into<String>,
        quantity: FieldValue,
        cost_basis: FieldValue,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            portfolio_id,
            symbol: symbol.into().trim().to_uppercase(),
            quantity,
            cost_basis,
            created_at: Utc::now(),
        }
    }

    /// Stand-in for a stored row that does not deserialize. Keeps the keys and,
    /// if it is text, the symbol; both numeric fields hold their raw slot values
    /// as `Invalid` so the position renders locked and is never re-sealed.
    pub fn from_unreadable_row(id: Uuid, portfolio_id: Uuid, row: &Value) -> Self {
        let raw_slot = |name: &str| FieldValue::Invalid(row.get(name).cloned().unwrap_or(Value::Null));
        Self {
            id,
            portfolio_id,
            symbol: row
                .get("symbol")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            quantity: raw_slot("quantity"),
            cost_basis: raw_slot("cost_basis"),
            created_at: DateTime::default(),
        }
    }
}
