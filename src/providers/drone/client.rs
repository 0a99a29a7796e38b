use url::Url;

use super::types::DroneBuild;
use crate::auth::Credentials;
use crate::error::Result;
use crate::providers::client::{join, probe_failure, ApiClient};
use crate::target::TargetPath;

pub struct DroneClient {
    api: ApiClient,
    builds_url: Url,
}

impl DroneClient {
    pub fn new(base_url: &Url, target: &TargetPath, credentials: Option<Credentials>) -> Result<Self> {
        let builds_url = join(
            base_url,
            &format!("api/repos/{}/{}/builds", target.owner, target.name),
        )?;

        Ok(Self {
            api: ApiClient::new(credentials)?,
            builds_url,
        })
    }

    /// Every build the server lists for the repository. The length of this
    /// list is the upstream total.
    pub async fn fetch_builds(&self) -> Result<Vec<DroneBuild>> {
        self.api
            .get_json(self.builds_url.clone())
            .await
            .map_err(probe_failure)
    }
}
