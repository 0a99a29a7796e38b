use url::Url;

use super::types::{BambooLatestResult, BambooResult};
use crate::auth::Credentials;
use crate::error::{BuildStatsError, Result};
use crate::providers::client::{join, probe_failure, ApiClient};
use crate::target::TargetPath;

/// `PROJECT-PLAN` pair identifying a Bamboo build plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanKey {
    project: String,
    plan: String,
}

impl PlanKey {
    pub fn parse(target: &TargetPath) -> Result<Self> {
        match target.name.split_once('-') {
            Some((project, plan)) if !project.is_empty() && !plan.is_empty() => Ok(Self {
                project: project.to_string(),
                plan: plan.to_string(),
            }),
            _ => Err(BuildStatsError::InvalidTargetPath {
                path: target.dir.clone(),
                reason: format!(
                    "expected the last segment to be PROJECT-PLAN, found {:?}",
                    target.name
                ),
            }),
        }
    }
}

impl std::fmt::Display for PlanKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.project, self.plan)
    }
}

pub struct BambooClient {
    api: ApiClient,
    result_url: Url,
    plan: PlanKey,
}

impl BambooClient {
    pub fn new(api_url: &Url, plan: PlanKey, credentials: Option<Credentials>) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(credentials)?,
            result_url: join(api_url, "result/")?,
            plan,
        })
    }

    fn build_url(&self, suffix: &str) -> Result<Url> {
        join(&self.result_url, &format!("{}-{suffix}.json", self.plan))
    }

    /// Number of the newest build of the plan.
    pub async fn latest_build_number(&self) -> Result<u64> {
        let url = self.build_url("latest")?;
        let latest: BambooLatestResult = self.api.get_json(url).await.map_err(probe_failure)?;

        Ok(latest.build_number)
    }

    pub async fn fetch_build(&self, build_number: u64) -> Result<BambooResult> {
        let url = self.build_url(&build_number.to_string())?;
        self.api.get_json(url).await
    }
}
