use anyhow::Context;
use clap::Parser;
use dashboard_cache::cache::CacheRegistry;
use dashboard_cache::cli::Args;
use dashboard_cache::config::Config;
use dashboard_cache::demo::{self, SimulatedBackend};
use dashboard_cache::logging::setup_logging;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

const BACKEND_LATENCY: Duration = Duration::from_millis(150);

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Load config and setup logging first so startup logs are never silently dropped
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };
    setup_logging(&config, args.tracing);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = env!("GIT_COMMIT_SHORT"),
        ttl = ?config.cache_ttl,
        fetch_timeout = ?config.cache_fetch_timeout,
        "starting dashboard-cache"
    );

    match run(&config, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "dashboard simulation failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &Config, args: &Args) -> anyhow::Result<()> {
    let registry = CacheRegistry::new();
    let backend = Arc::new(SimulatedBackend::new(BACKEND_LATENCY));

    let report = demo::run(
        &registry,
        backend,
        config.cache_options(),
        usize::from(args.viewers),
    )
    .await?;

    let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
    println!("{json}");
    Ok(())
}
