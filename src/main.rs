use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use news_collector::{config, Collector, CollectorConfig, Store};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "news-collector", about = "Topic-driven feed collector with cross-feed dedup")]
struct Cli {
    /// Run a single poll cycle and exit.
    #[arg(long)]
    once: bool,

    /// Poll interval in seconds.
    #[arg(long)]
    interval: Option<u64>,

    /// JSON file with the feed list, overriding the built-in defaults.
    #[arg(long)]
    feeds: Option<PathBuf>,

    /// Address for the liveness endpoint, e.g. 127.0.0.1:8090.
    #[arg(long)]
    health_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut collector_config = CollectorConfig::from_env();
    if let Some(seconds) = cli.interval {
        collector_config.poll_interval = Duration::from_secs(seconds);
    }
    if let Some(path) = &cli.feeds {
        collector_config.feeds = config::load_feeds_file(path)
            .with_context(|| format!("failed to load feeds file {}", path.display()))?;
    }

    let store = Arc::new(
        Store::connect_from_env()
            .await
            .context("failed to connect to the store")?,
    );
    store.init_schema().await.context("failed to initialize schema")?;

    info!(
        "Starting collector: {} feeds, {:?} backend, {} enrichment-eligible topics",
        collector_config.feeds.len(),
        store.backend(),
        collector_config.enrichment_topics.len()
    );

    if let Some(addr) = cli.health_addr {
        tokio::spawn(async move {
            if let Err(e) = news_collector::health::serve(addr).await {
                error!("Health endpoint stopped: {}", e);
            }
        });
    }

    let collector = Collector::new(collector_config, store);

    if cli.once {
        let stats = collector.run_cycle().await;
        info!(
            "Single cycle done: {} inserted, {} duplicates, {} off-topic",
            stats.inserted, stats.duplicates, stats.no_topic
        );
        return Ok(());
    }

    tokio::select! {
        _ = collector.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested, stopping collector");
        }
    }

    Ok(())
}
