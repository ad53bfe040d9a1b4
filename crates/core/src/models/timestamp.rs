use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Row timestamps arrive either as RFC 3339 text or as unix seconds
/// (SQL `DEFAULT (unixepoch())` columns).
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTime {
    Rfc3339(DateTime<Utc>),
    UnixSeconds(#[serde(with = "chrono::serde::ts_seconds")] DateTime<Utc>),
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match StoredTime::deserialize(deserializer)? {
        StoredTime::Rfc3339(t) | StoredTime::UnixSeconds(t) => Ok(t),
    }
}
