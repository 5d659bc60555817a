use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use remarker::{
    config::{Config, LogFormat},
    content::{ClaimDrafter, StanceClassifier},
    graph::{GraphStore, SnapshotBridge},
    oracle::GeminiClient,
    router::Router,
    server::EventServer,
    transport::DiscordTransport,
};

/// Conversational-discourse orchestrator.
#[derive(Debug, Parser)]
#[command(name = "remarker", version, about)]
struct Args {
    /// Override the graph snapshot path.
    #[arg(long)]
    snapshot_path: Option<PathBuf>,

    /// Override the log level (e.g. debug, info, warn).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(path) = args.snapshot_path {
        config.snapshot.path = path;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_logging(&config);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Remarker starting..."
    );

    // Restore the graph from its snapshot
    let snapshots = Arc::new(SnapshotBridge::new(&config.snapshot));
    let oracle = Arc::new(GeminiClient::new(&config.oracle, config.request.clone())?);
    let classifier = StanceClassifier::new(oracle.clone());

    let graph = match GraphStore::restore(snapshots, classifier).await {
        Ok(g) => {
            info!(path = %config.snapshot.path.display(), nodes = g.len(), "Graph restored");
            Arc::new(g)
        }
        Err(e) => {
            error!(error = %e, "Failed to restore discourse graph");
            return Err(e.into());
        }
    };

    let transport = match DiscordTransport::new(&config.discord, &config.request) {
        Ok(t) => {
            info!(base_url = %config.discord.base_url, "Discord transport initialized");
            Arc::new(t)
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize Discord transport");
            return Err(e.into());
        }
    };

    let drafter = ClaimDrafter::new(oracle);
    let router = Router::new(graph.clone(), drafter, transport);
    let server = EventServer::new(router);

    info!("Server ready, waiting for events on stdin...");

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        graph.flush().await;
        return Err(e.into());
    }

    // Pending snapshot writes must land before exit
    graph.flush().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
