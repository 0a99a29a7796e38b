use std::collections::BTreeSet;
use std::iter;
use std::path::Path;

use async_trait::async_trait;
use log::{info, warn};

use super::client::DroneClient;
use super::normalize::to_build_record;
use crate::error::{BuildStatsError, Result};
use crate::providers::client::base_url;
use crate::providers::{DownloadOptions, DownloadSummary, Provider};
use crate::scheduler::{NoopObserver, WorkerPool};
use crate::storage::BuildStore;
use crate::target::TargetPath;

pub const DEFAULT_BASE_URL: &str = "https://cloud.drone.io";

/// Drone returns the build list in a single response; every listed build that
/// is not on disk yet is written.
pub struct DroneProvider {
    base_url: String,
}

impl DroneProvider {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }
}

#[async_trait]
impl Provider for DroneProvider {
    fn name(&self) -> &'static str {
        "Drone"
    }

    async fn download(
        &self,
        target_dir: &Path,
        options: &DownloadOptions,
    ) -> Result<DownloadSummary> {
        let target = TargetPath::parse(target_dir)?;
        target.matches_provider(self.name());
        let client = DroneClient::new(
            &base_url(&self.base_url)?,
            &target,
            options.credentials.clone(),
        )?;
        let store = BuildStore::new(target_dir);
        let repo = format!("{}/{}", target.owner, target.name);

        let persisted = match options.since {
            Some(_) => BTreeSet::new(),
            None => store.persisted_ids().await?,
        };

        let pool = WorkerPool::new(options.concurrency);
        let builds = pool
            .run(iter::once(client.fetch_builds()), &NoopObserver)
            .await
            .map_err(BuildStatsError::into_root)?
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();

        // One task per build number; a repeated number keeps its first entry.
        let mut listed = BTreeSet::new();
        let builds = builds
            .into_iter()
            .filter(|build| listed.insert(build.number))
            .collect::<Vec<_>>();

        let total = builds.len() as u64;
        if builds.is_empty() {
            warn!("No builds found for repository: {repo}");
        }

        let missing = builds
            .into_iter()
            .filter(|build| match options.since {
                Some(since) => build.number > since,
                None => !persisted.contains(&build.number),
            })
            .collect::<Vec<_>>();

        info!(
            "Repository {repo}: {total} builds upstream, {} to download",
            missing.len()
        );

        if missing.is_empty() {
            return Ok(DownloadSummary::up_to_date(total));
        }

        store.ensure_dir().await?;

        let tasks = missing.into_iter().map(|build| {
            let store = &store;
            async move { store.write(&to_build_record(build)).await }
        });
        let written = pool.run(tasks, options.observer.as_ref()).await?;

        info!("Repository {repo}: downloaded {} builds", written.len());

        Ok(DownloadSummary {
            fetched: written.len(),
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use crate::models::{BuildRecord, BuildResult};
    use mockito::{Mock, Server, ServerGuard};
    use std::num::NonZeroUsize;
    use std::path::PathBuf;

    const BUILDS_PATH: &str = "/api/repos/octocat/hello-world/builds";

    fn target_dir(root: &Path) -> PathBuf {
        root.join("drone").join("octocat").join("hello-world")
    }

    fn provider(server: &ServerGuard) -> DroneProvider {
        DroneProvider::new(server.url())
    }

    fn options() -> DownloadOptions {
        DownloadOptions::new(NonZeroUsize::new(4).unwrap())
    }

    fn read_record(dir: &Path, id: u64) -> BuildRecord {
        serde_json::from_slice(&std::fs::read(dir.join(format!("{id}.json"))).unwrap()).unwrap()
    }

    async fn mock_builds(server: &mut ServerGuard) -> Mock {
        let body = serde_json::json!([
            {"id": 903, "number": 12, "status": "error", "event": "push", "source": "main",
             "created": 100, "started": "0", "finished": 150},
            {"id": 902, "number": 9, "status": "success", "event": "pull_request", "source": "fix",
             "created": 50, "started": 60, "finished": 90},
            {"id": 901, "number": 5, "status": "killed", "event": "push", "source": "main",
             "created": 10, "started": 11, "finished": 12}
        ]);
        server
            .mock("GET", BUILDS_PATH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .expect(1)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_first_run_writes_every_listed_build() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        let dir = target_dir(tmp.path());
        let builds = mock_builds(&mut server).await;

        let summary = provider(&server).download(&dir, &options()).await.unwrap();

        assert_eq!(summary, DownloadSummary { fetched: 3, total: 3 });
        builds.assert_async().await;

        let errored = read_record(&dir, 12);
        assert_eq!(errored.result, BuildResult::Failed);
        assert_eq!(errored.created_on, 100_000);
        assert_eq!(errored.duration, 50);
        assert_eq!(errored.uuid, "903");
        assert_eq!(read_record(&dir, 9).ref_type, "pull_request");
        assert_eq!(read_record(&dir, 5).result, BuildResult::Stopped);
    }

    #[tokio::test]
    async fn test_already_persisted_builds_are_skipped() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        let dir = target_dir(tmp.path());
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("9.json"), "{}").unwrap();
        let _builds = mock_builds(&mut server).await;

        let summary = provider(&server).download(&dir, &options()).await.unwrap();

        assert_eq!(summary, DownloadSummary { fetched: 2, total: 3 });
        assert_eq!(std::fs::read_to_string(dir.join("9.json")).unwrap(), "{}");
        assert!(dir.join("5.json").exists());
        assert!(dir.join("12.json").exists());
    }

    #[tokio::test]
    async fn test_fully_mirrored_repository_writes_nothing() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        let dir = target_dir(tmp.path());
        std::fs::create_dir_all(&dir).unwrap();
        for id in [5, 9, 12] {
            std::fs::write(dir.join(format!("{id}.json")), "{}").unwrap();
        }
        let _builds = mock_builds(&mut server).await;

        let summary = provider(&server).download(&dir, &options()).await.unwrap();

        assert_eq!(summary, DownloadSummary { fetched: 0, total: 3 });
        assert_eq!(std::fs::read_to_string(dir.join("12.json")).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_since_rewrites_newer_builds_only() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        let dir = target_dir(tmp.path());
        std::fs::create_dir_all(&dir).unwrap();
        for id in [5, 9, 12] {
            std::fs::write(dir.join(format!("{id}.json")), "{}").unwrap();
        }
        let _builds = mock_builds(&mut server).await;

        let options = options().with_since(Some(5));
        let summary = provider(&server).download(&dir, &options).await.unwrap();

        assert_eq!(summary.fetched, 2);
        assert_eq!(std::fs::read_to_string(dir.join("5.json")).unwrap(), "{}");
        assert_eq!(read_record(&dir, 9).id, 9);
        assert_eq!(read_record(&dir, 12).id, 12);
    }

    #[tokio::test]
    async fn test_repeated_build_numbers_are_written_once() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        let dir = target_dir(tmp.path());
        let body = (0..200)
            .map(|i| {
                serde_json::json!({
                    "id": 500 + i, "number": 1 + i % 2, "status": "success",
                    "created": 10, "started": 11, "finished": 12
                })
            })
            .collect::<Vec<_>>();
        let _builds = server
            .mock("GET", BUILDS_PATH)
            .with_body(serde_json::Value::Array(body).to_string())
            .create_async()
            .await;

        let options = DownloadOptions::new(NonZeroUsize::new(16).unwrap());
        let summary = provider(&server).download(&dir, &options).await.unwrap();

        assert_eq!(summary, DownloadSummary { fetched: 2, total: 2 });
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 2);
        assert_eq!(read_record(&dir, 1).uuid, "500");
        assert_eq!(read_record(&dir, 2).uuid, "501");
    }

    #[tokio::test]
    async fn test_bearer_token_is_sent() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        let dir = target_dir(tmp.path());
        let builds = server
            .mock("GET", BUILDS_PATH)
            .match_header("authorization", "Bearer drone-token")
            .with_body("[]")
            .create_async()
            .await;

        let options = options().with_credentials(Some(Credentials::bearer("drone-token")));
        let summary = provider(&server).download(&dir, &options).await.unwrap();

        assert_eq!(summary, DownloadSummary { fetched: 0, total: 0 });
        builds.assert_async().await;
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_unreachable_list_is_upstream_unavailable() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        let dir = target_dir(tmp.path());
        let _builds = server
            .mock("GET", BUILDS_PATH)
            .with_status(502)
            .create_async()
            .await;

        let err = provider(&server).download(&dir, &options()).await.unwrap_err();

        assert!(matches!(err, BuildStatsError::UpstreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_list_with_wrong_shape_is_upstream_unavailable() {
        let mut server = Server::new_async().await;
        let tmp = tempfile::tempdir().unwrap();
        let dir = target_dir(tmp.path());
        let _builds = server
            .mock("GET", BUILDS_PATH)
            .with_body(r#"{"message":"not found"}"#)
            .create_async()
            .await;

        let err = provider(&server).download(&dir, &options()).await.unwrap_err();

        assert!(matches!(err, BuildStatsError::UpstreamUnavailable { .. }));
    }
}
