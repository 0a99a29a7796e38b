use serde::Deserialize;

use crate::providers::decode;

/// One entry of `api/repos/{user}/{repo}/builds`. Timestamps are epoch seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct DroneBuild {
    pub number: u64,
    #[serde(default, deserialize_with = "decode::id_string")]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "decode::int")]
    pub created: i64,
    /// `0` when the build never ran, e.g. the pipeline file failed to parse.
    #[serde(default, deserialize_with = "decode::int")]
    pub started: i64,
    #[serde(default, deserialize_with = "decode::int")]
    pub finished: i64,
    pub event: Option<String>,
    pub source: Option<String>,
}
