mod chain;
mod config;
mod error;
mod notify;
mod reconcile;

use std::{fs::OpenOptions, sync::Arc};

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    chain::{keys, substrate::SubstrateClient},
    config::AppConfig,
    error::AppResult,
    notify::TelegramNotifier,
    reconcile::{report::RunSummary, ReconciliationRunner},
};

const DEFAULT_LOG_FILE: &str = "payout.log";

// Initialize logging to stdout and the payout log file
fn init_tracing() {
    let log_path = std::env::var("PAYOUT_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.into());
    let log_file = OpenOptions::new().create(true).append(true).open(&log_path);

    let (file_layer, file_error) = match log_file {
        Ok(file) => (
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file))),
            None,
        ),
        Err(e) => (None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,payout=debug".into()),
        ))
        .with(fmt::layer())
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        warn!("Cannot open log file {}, logging to stdout only: {}", log_path, e);
    }
}

async fn run() -> AppResult<RunSummary> {
    let config = AppConfig::load()?;
    info!(
        "⚙️  {} validator(s) on {}, last {} era(s), notifications: {}",
        config.validators.len(),
        config.network,
        config.num_eras,
        match &config.notify_target {
            Some(_) => config.notification_mode.as_str(),
            None => "disabled",
        }
    );

    let signer = {
        let phrase = keys::load_seed(&config.seed_file)?;
        keys::derive_signer(&phrase)?
    };

    let chain = Arc::new(SubstrateClient::connect(&config.rpc_url, signer).await?);
    let notifier = Arc::new(TelegramNotifier::new());

    let runner = ReconciliationRunner::new(chain, notifier, config.reconciliation_settings());

    Ok(runner.run(&config.validators).await)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("🚀 Starting staking payout run");

    let summary = run().await?;

    for validator in &summary.validators {
        match &validator.result {
            Ok(report) => info!(
                "📋 {} at era {}: {} paid, {} failed, {} already claimed, tx [{}]",
                validator.stash,
                report.current_era,
                report.succeeded(),
                report.failed(),
                report.claimed_eras.len(),
                report.transactions().join(", ")
            ),
            Err(e) => error!("📋 {} aborted: {}", validator.stash, e),
        }
    }

    info!(
        "✓ Run finished in {}s: {} validator(s), {} payout(s) succeeded, {} failed, {} aborted",
        (summary.finished_at - summary.started_at).num_seconds(),
        summary.validators.len(),
        summary.payouts_succeeded(),
        summary.payouts_failed(),
        summary.aborted()
    );

    Ok(())
}
