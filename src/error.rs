use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildStatsError {
    #[error("Upstream unavailable at {url}: {reason}")]
    UpstreamUnavailable { url: String, reason: String },

    #[error("Malformed upstream response from {url}: {reason}")]
    MalformedUpstreamResponse { url: String, reason: String },

    #[error("Failed to persist to {}: {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid target path {}: {reason}", path.display())]
    InvalidTargetPath { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Download aborted after {completed} of {total} tasks succeeded: {source}")]
    Aborted {
        completed: usize,
        total: usize,
        #[source]
        source: Box<BuildStatsError>,
    },
}

impl BuildStatsError {
    pub fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PersistenceFailure {
            path: path.into(),
            source,
        }
    }

    /// Strips scheduler bookkeeping and returns the error a task actually hit.
    pub fn into_root(self) -> Self {
        match self {
            Self::Aborted { source, .. } => source.into_root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildStatsError>;
