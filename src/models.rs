use serde::{Deserialize, Serialize};

/// Trigger type recorded when a provider does not expose one.
pub const REF_TYPE_UNAVAILABLE: &str = "not available";

/// Branch recorded when a provider does not expose one.
pub const DEFAULT_REF_NAME: &str = "master";

/// Provider-agnostic record of a single build, persisted as `<id>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRecord {
    pub id: u64,
    pub uuid: String,
    /// Build start, epoch milliseconds.
    pub created_on: i64,
    /// Wall-clock duration in seconds.
    pub duration: i64,
    pub result: BuildResult,
    pub ref_type: String,
    pub ref_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildResult {
    Successful,
    Failed,
    Stopped,
    /// Provider-native value with no canonical mapping, stored uppercased.
    Other(String),
}

impl BuildResult {
    /// Maps a provider-native state, ignoring case.
    pub fn from_native(state: &str) -> Self {
        match state.to_uppercase().as_str() {
            "SUCCESSFUL" => Self::Successful,
            "FAILED" => Self::Failed,
            "STOPPED" => Self::Stopped,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Successful => "SUCCESSFUL",
            Self::Failed => "FAILED",
            Self::Stopped => "STOPPED",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for BuildResult {
    fn from(value: String) -> Self {
        Self::from_native(&value)
    }
}

impl From<BuildResult> for String {
    fn from(value: BuildResult) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for BuildResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
