use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;

use crate::auth::Credentials;
use crate::providers::{drone, BambooProvider, DownloadOptions, DroneProvider, Provider};
use crate::scheduler::DownloadObserver;

#[derive(Parser)]
#[command(name = "buildstats")]
#[command(author, version, about = "Incrementally mirror CI build history to disk", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty print the JSON run summary
    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,
}

#[derive(Args)]
struct DownloadArgs {
    /// Directory holding one JSON file per build; its last three segments are
    /// <provider>/<owner>/<name>
    target_dir: PathBuf,

    /// Maximum number of requests in flight
    #[arg(short, long, default_value = "10")]
    concurrency: NonZeroUsize,

    /// Download builds after this number, ignoring what is already on disk
    #[arg(short, long)]
    since: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror builds of a Bamboo plan into <dir>/<bamboo-host>/<PROJECT-PLAN>
    Bamboo {
        #[command(flatten)]
        download: DownloadArgs,

        /// Bamboo credentials as USER:PASSWORD
        #[arg(short, long, env = "BAMBOO_AUTH", hide_env_values = true)]
        auth: Option<String>,

        /// Bamboo REST root (defaults to https://<bamboo-host>/rest/api/latest)
        #[arg(short, long)]
        base_url: Option<String>,
    },
    /// Mirror builds of a Drone repository into <dir>/<user>/<repo>
    Drone {
        #[command(flatten)]
        download: DownloadArgs,

        /// Drone API token (optional, required for private repositories)
        #[arg(short, long, env = "DRONE_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Drone server URL
        #[arg(short, long, default_value = drone::DEFAULT_BASE_URL)]
        base_url: String,
    },
}

/// Reports scheduler progress through the log.
struct LogProgress;

impl DownloadObserver for LogProgress {
    fn on_progress(&self, completed: usize, total: usize) {
        info!("Downloaded data for {completed} of {total} builds");
    }
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let (provider, credentials, download) = match &self.command {
            Commands::Bamboo {
                download,
                auth,
                base_url,
            } => {
                let credentials = auth
                    .as_deref()
                    .filter(|auth| !auth.is_empty())
                    .map(Credentials::parse_basic)
                    .transpose()?;
                let provider: Box<dyn Provider> = Box::new(BambooProvider::new(base_url.clone()));
                (provider, credentials, download)
            }
            Commands::Drone {
                download,
                token,
                base_url,
            } => {
                let credentials = token
                    .as_deref()
                    .filter(|token| !token.is_empty())
                    .map(Credentials::bearer);
                let provider: Box<dyn Provider> = Box::new(DroneProvider::new(base_url.clone()));
                (provider, credentials, download)
            }
        };

        info!(
            "Mirroring {} builds into {}",
            provider.name(),
            download.target_dir.display()
        );

        let options = DownloadOptions::new(download.concurrency)
            .with_credentials(credentials)
            .with_observer(Arc::new(LogProgress))
            .with_since(download.since);

        let summary = provider.download(&download.target_dir, &options).await?;
        info!("Download completed. Total builds: {}", summary.total);

        let json_output = if self.pretty {
            serde_json::to_string_pretty(&summary)?
        } else {
            serde_json::to_string(&summary)?
        };
        println!("{json_output}");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bamboo_defaults() {
        let cli = Cli::try_parse_from(["buildstats", "bamboo", "builds/bamboo/host/PROJ-PLAN"])
            .unwrap();

        match cli.command {
            Commands::Bamboo {
                download, base_url, ..
            } => {
                assert_eq!(download.concurrency.get(), 10);
                assert_eq!(download.since, None);
                assert_eq!(base_url, None);
            }
            Commands::Drone { .. } => panic!("expected bamboo"),
        }
    }

    #[test]
    fn test_drone_flags() {
        let cli = Cli::try_parse_from([
            "buildstats",
            "drone",
            "builds/drone/octocat/hello-world",
            "--concurrency",
            "3",
            "--since",
            "40",
            "--base-url",
            "https://drone.internal",
            "--pretty",
        ])
        .unwrap();

        assert!(cli.pretty);
        match cli.command {
            Commands::Drone {
                download, base_url, ..
            } => {
                assert_eq!(download.concurrency.get(), 3);
                assert_eq!(download.since, Some(40));
                assert_eq!(base_url, "https://drone.internal");
            }
            Commands::Bamboo { .. } => panic!("expected drone"),
        }
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let result = Cli::try_parse_from([
            "buildstats",
            "drone",
            "builds/drone/octocat/hello-world",
            "--concurrency",
            "0",
        ]);

        assert!(result.is_err());
    }
}
