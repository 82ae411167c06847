// Main entry point for one crawl cycle

use anyhow::{Context, Result};
use clap::Parser;
use follow_crawler::{run_cycle, Config, SqliteGraphStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use twitter_client::TwitterClient;

#[derive(Parser)]
#[command(name = "follow-crawler")]
#[command(about = "Refresh one account of the follow graph per invocation")]
struct Cli {
    /// Handle to bootstrap from when the store is empty
    seed_handle: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,follow_crawler=debug,twitter_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Started");

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!(error = %format!("{e:#}"), "crawl cycle failed");
        std::process::exit(1);
    }

    tracing::info!("Finished");
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let store = SqliteGraphStore::new(&config.database_url)
        .await
        .context("Failed to open graph store")?;
    let client = TwitterClient::new(config.bearer_token);

    run_cycle(&store, &client, cli.seed_handle.as_deref()).await?;

    Ok(())
}
