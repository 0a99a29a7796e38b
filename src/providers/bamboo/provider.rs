use std::path::Path;

use async_trait::async_trait;
use log::info;
use url::Url;

use super::client::{BambooClient, PlanKey};
use super::normalize::to_build_record;
use crate::error::{BuildStatsError, Result};
use crate::providers::client::base_url;
use crate::providers::{DownloadOptions, DownloadSummary, Provider};
use crate::scheduler::WorkerPool;
use crate::storage::BuildStore;
use crate::target::TargetPath;

/// REST prefix appended to the host taken from the target directory.
const DEFAULT_API_PATH: &str = "rest/api/latest";

/// Bamboo numbers builds 1, 2, 3, ... per plan, so each missing build is one
/// request for `result/{PROJECT}-{PLAN}-{n}.json`.
pub struct BambooProvider {
    base_url: Option<String>,
}

impl BambooProvider {
    /// `base_url` points at the REST root (e.g. `https://host/rest/api/latest`);
    /// without it the host segment of the target directory is used.
    pub fn new(base_url: Option<String>) -> Self {
        Self { base_url }
    }

    fn api_url(&self, target: &TargetPath) -> Result<Url> {
        match &self.base_url {
            Some(url) => base_url(url),
            None => base_url(&format!("https://{}/{DEFAULT_API_PATH}", target.owner)),
        }
    }
}

#[async_trait]
impl Provider for BambooProvider {
    fn name(&self) -> &'static str {
        "Bamboo"
    }

    async fn download(
        &self,
        target_dir: &Path,
        options: &DownloadOptions,
    ) -> Result<DownloadSummary> {
        let target = TargetPath::parse(target_dir)?;
        target.matches_provider(self.name());
        let plan = PlanKey::parse(&target)?;
        let client = BambooClient::new(
            &self.api_url(&target)?,
            plan.clone(),
            options.credentials.clone(),
        )?;
        let store = BuildStore::new(target_dir);

        let resume_point = match options.since {
            Some(since) => Some(since),
            None => store.last_downloaded().await?,
        };
        let start = resume_point.map_or(1, |last| last.saturating_add(1));
        let total = client.latest_build_number().await?;

        info!("Plan {plan}: starting at build {start}, latest upstream build is {total}");

        if start > total {
            info!("Plan {plan} is up to date");
            return Ok(DownloadSummary::up_to_date(total));
        }

        store.ensure_dir().await?;

        let count = usize::try_from(total - start + 1).map_err(|_| {
            BuildStatsError::Config(format!(
                "plan {plan} has too many builds to schedule from {start} to {total}"
            ))
        })?;

        let pool = WorkerPool::new(options.concurrency);
        let tasks = (0..count).map(|offset| {
            let build_number = start + offset as u64;
            let client = &client;
            let store = &store;
            async move {
                let result = client.fetch_build(build_number).await?;
                store.write(&to_build_record(result)).await
            }
        });
        let written = pool.run(tasks, options.observer.as_ref()).await?;

        info!("Plan {plan}: downloaded {} builds", written.len());

        Ok(DownloadSummary {
            fetched: written.len(),
            total,
        })
    }
}
