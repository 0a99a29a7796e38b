use super::types::BambooResult;
use crate::models::{BuildRecord, BuildResult, DEFAULT_REF_NAME, REF_TYPE_UNAVAILABLE};

/// State reported for builds Bamboo has not finished (or never ran).
const UNKNOWN_STATE: &str = "Unknown";

pub fn to_build_record(result: BambooResult) -> BuildRecord {
    // Prefer Bamboo's own duration; derive it from timestamps only when absent.
    let duration = result
        .build_duration_in_seconds
        .or_else(|| {
            let started = result.build_started_time?;
            let completed = result.build_completed_time?;
            Some(completed.saturating_sub(started) / 1000)
        })
        .unwrap_or(0)
        .max(0);

    BuildRecord {
        id: result.build_number,
        uuid: result.id,
        created_on: result.build_started_time.unwrap_or(0),
        duration,
        result: BuildResult::from_native(result.build_state.as_deref().unwrap_or(UNKNOWN_STATE)),
        ref_type: REF_TYPE_UNAVAILABLE.to_string(),
        ref_name: DEFAULT_REF_NAME.to_string(),
    }
}
