use super::types::DroneBuild;
use crate::models::{BuildRecord, BuildResult, DEFAULT_REF_NAME, REF_TYPE_UNAVAILABLE};

fn map_status(status: &str) -> BuildResult {
    match status {
        "success" => BuildResult::Successful,
        "failed" | "error" => BuildResult::Failed,
        _ => BuildResult::Stopped,
    }
}

pub fn to_build_record(build: DroneBuild) -> BuildRecord {
    let started = if build.started != 0 {
        build.started
    } else {
        build.created
    };

    BuildRecord {
        id: build.number,
        uuid: build.id,
        created_on: started.saturating_mul(1000),
        duration: build.finished.saturating_sub(started).max(0),
        result: map_status(&build.status),
        ref_type: build
            .event
            .unwrap_or_else(|| REF_TYPE_UNAVAILABLE.to_string()),
        ref_name: build.source.unwrap_or_else(|| DEFAULT_REF_NAME.to_string()),
    }
}
