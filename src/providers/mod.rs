pub mod bamboo;
mod client;
mod decode;
pub mod drone;

use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::auth::Credentials;
use crate::error::Result;
use crate::scheduler::{DownloadObserver, NoopObserver};

pub use bamboo::BambooProvider;
pub use drone::DroneProvider;

/// Per-run settings handed to [`Provider::download`].
#[derive(Clone)]
pub struct DownloadOptions {
    pub credentials: Option<Credentials>,
    pub concurrency: NonZeroUsize,
    pub observer: Arc<dyn DownloadObserver>,
    /// Overrides the resume point found on disk.
    pub since: Option<u64>,
}

impl DownloadOptions {
    pub fn new(concurrency: NonZeroUsize) -> Self {
        Self {
            credentials: None,
            concurrency,
            observer: Arc::new(NoopObserver),
            since: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn DownloadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_since(mut self, since: Option<u64>) -> Self {
        self.since = since;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DownloadSummary {
    /// Builds written during this run.
    pub fetched: usize,
    /// Upstream build count (or latest build number) seen when the run began.
    pub total: u64,
}

impl DownloadSummary {
    pub fn up_to_date(total: u64) -> Self {
        Self { fetched: 0, total }
    }
}

#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Mirrors every build missing from `target_dir`.
    async fn download(&self, target_dir: &Path, options: &DownloadOptions)
        -> Result<DownloadSummary>;
}
