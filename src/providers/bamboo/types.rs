use serde::Deserialize;

use crate::providers::decode;

/// Body of `result/{plan}-latest.json`; only the build number is needed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BambooLatestResult {
    pub build_number: u64,
}

/// Body of `result/{plan}-{n}.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BambooResult {
    pub build_number: u64,
    #[serde(default, deserialize_with = "decode::id_string")]
    pub id: String,
    pub build_state: Option<String>,
    #[serde(default, deserialize_with = "decode::opt_timestamp_millis")]
    pub build_started_time: Option<i64>,
    #[serde(default, deserialize_with = "decode::opt_timestamp_millis")]
    pub build_completed_time: Option<i64>,
    pub build_duration_in_seconds: Option<i64>,
}
