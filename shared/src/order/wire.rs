//! Lenient decoding for records written by older clients
//!
//! Stored records may carry amounts as numbers, numeric strings or `""`,
//! and ids as either strings or integers.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientId {
    Text(String),
    Integer(i64),
}

/// `null`, `""` and missing all decode to `None`
pub(crate) fn deserialize_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<LenientNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(LenientNumber::Number(n)) => Ok(Some(n)),
        Some(LenientNumber::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map(Some)
                .map_err(|_| D::Error::custom(format!("invalid amount: {:?}", s)))
        }
    }
}

pub(crate) fn deserialize_record_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LenientId>::deserialize(deserializer)? {
        None => None,
        Some(LenientId::Text(s)) if s.is_empty() => None,
        Some(LenientId::Text(s)) => Some(s),
        Some(LenientId::Integer(n)) => Some(n.to_string()),
    })
}
