use serde::{Deserialize, Serialize};

use crate::crypto::KdfParams;
use crate::errors::CoreError;

/// What to do with a numeric write while no key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Store the raw number. The field stays plaintext until re-sealed.
    #[default]
    PlaintextFallback,
    /// Refuse the write with `CoreError::Locked`.
    RequireKey,
}

/// Client configuration. Missing fields in a JSON document take their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Currency assigned to new portfolios when none is given.
    pub default_currency: String,

    /// Key-derivation algorithm and cost.
    pub kdf: KdfParams,

    /// Behaviour of numeric writes while the session is locked.
    pub write_policy: WritePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            kdf: KdfParams::default(),
            write_policy: WritePolicy::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::Deserialization(format!("Invalid settings: {e}")))
    }
}
