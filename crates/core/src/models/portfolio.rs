use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named group of positions belonging to one user.
/// Assets reference their portfolio by id; deleting a portfolio removes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: Uuid,

    /// Username of the owner
    pub owner: String,

    pub name: String,

    /// Display currency (e.g., "USD", "EUR")
    #[serde(default = "default_currency")]
    pub currency: String,

    #[serde(default, deserialize_with = "super::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Portfolio {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, currency: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            name: name.into(),
            currency: currency
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(default_currency),
            created_at: Utc::now(),
        }
    }
}
