/*
[INPUT]:  CLI arguments, YAML configuration file, OS shutdown signals
[OUTPUT]: Running PredictIt feed client with graceful shutdown
[POS]:    Binary entry point
[UPDATE]: When changing CLI flags, startup flow, or shutdown handling
*/

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use predictit_adapter::{ClientConfig, Credentials, FeedClient, PredictItClient, SessionContext};
use predictit_feed::{FeedSettings, LoggingConsumer, run_until_shutdown};

#[derive(Parser, Debug)]
#[command(name = "predictit-feed", version, about = "PredictIt realtime market data feed")]
struct Cli {
    #[arg(long = "config", value_name = "PATH")]
    config_path: PathBuf,
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    log_level: String,
    /// Subscribe to this contract's order book, overriding the config
    #[arg(long = "contract", value_name = "ID")]
    contract_id: Option<String>,
    #[arg(long = "dry-run")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(&args.log_level)?;

    info!(
        config_path = %args.config_path.display(),
        dry_run = args.dry_run,
        "starting predictit-feed"
    );

    let mut settings = load_config(&args.config_path)?;
    if let Some(contract_id) = args.contract_id {
        settings.contract_id = Some(contract_id);
        settings.validate().context("validate --contract override")?;
    }
    info!(
        contract_id = settings.contract_id.as_deref().unwrap_or_default(),
        stats_contracts = settings.stats_contracts.len(),
        "configuration loaded"
    );

    if args.dry_run {
        info!("dry-run requested; configuration validated");
        return Ok(());
    }

    let credentials = Credentials::from_file(&settings.auth_file).context("load credentials")?;
    let http = match &settings.endpoints.http_base_url {
        Some(base_url) => PredictItClient::with_config_and_base_url(ClientConfig::default(), base_url),
        None => PredictItClient::new(),
    }
    .context("build http client")?;

    let session = SessionContext::establish(&http, &credentials)
        .await
        .context("establish session")?;

    let client = FeedClient::new(http, settings.feed_config());
    let consumer = Arc::new(LoggingConsumer::new());
    client.set_event_callback(consumer.clone());

    let shutdown = CancellationToken::new();
    setup_signal_handlers(shutdown.clone());

    info!("feed client running");
    let outcome = run_until_shutdown(
        &client,
        &session,
        settings.contract_id.clone(),
        settings.stats_filter(),
        shutdown,
    )
    .await;

    let counts = consumer.counts();
    info!(
        contract_stats = counts.contract_stats,
        orderbook = counts.orderbook,
        ownership_updates = counts.ownership_updates,
        raw = counts.raw,
        "feed client finished"
    );

    outcome.context("feed client failed")?;
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level).context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("initialize tracing subscriber")?;
    Ok(())
}

fn load_config(path: &PathBuf) -> Result<FeedSettings> {
    let path_str = path.to_str().context("config path must be valid utf-8")?;
    FeedSettings::from_file(path_str).context("load config")
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
