//! Lenient field decoders for upstream payloads.
//!
//! CI servers are inconsistent about whether numbers arrive as JSON numbers or
//! strings (Drone reports `"started": "0"` for builds that never ran), and
//! Bamboo reports timestamps as ISO-8601 text.

use chrono::DateTime;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

/// Integer given either as a JSON number or as a numeric string.
pub fn int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => Ok(value),
        NumberOrText::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| D::Error::custom(format!("expected an integer, found {text:?}"))),
    }
}

/// Opaque identifier given either as a number or a string.
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(value) => value.to_string(),
        NumberOrText::Text(text) => text,
    })
}

/// Optional timestamp as epoch milliseconds.
///
/// Numbers are taken as milliseconds already; text may be RFC 3339, an
/// ISO-8601 variant with a `+hhmm` offset, or a number in a string.
pub fn opt_timestamp_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<NumberOrText>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match raw {
        NumberOrText::Number(millis) => Ok(Some(millis)),
        NumberOrText::Text(text) => parse_timestamp_millis(&text)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("unrecognised timestamp {text:?}"))),
    }
}

fn parse_timestamp_millis(text: &str) -> Option<i64> {
    let text = text.trim();
    if let Ok(millis) = text.parse::<i64>() {
        return Some(millis);
    }

    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|timestamp| timestamp.timestamp_millis())
}
