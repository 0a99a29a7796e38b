mod auth;
mod cli;
mod error;
mod models;
mod providers;
mod scheduler;
mod storage;
mod target;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    info!("Starting buildstats");
    cli.execute().await?;

    Ok(())
}
