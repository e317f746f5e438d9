use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{error, info};

use slot_watch::config::Config;
use slot_watch::storage::JsonFileStore;
use slot_watch::telegram::TelegramNotifier;
use slot_watch::utils::logging;
use slot_watch::{run_once, source, RunSummary};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = logging::init() {
        eprintln!("Failed to initialise logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run().await {
        Ok(summary) => {
            info!(?summary, "Slot check finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Slot check failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<RunSummary> {
    let config = Config::load().context("Failed to load configuration")?;
    info!(
        "Watching {} for {} ({:?}, {:?})",
        config.targets.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", "),
        config.listing_url(),
        config.policy,
        config.match_mode
    );

    let source = source::from_config(&config).context("Failed to set up page source")?;
    let store = JsonFileStore::new(&config.state_file);
    let notifier = TelegramNotifier::from_config(&config).context("Failed to set up Telegram client")?;

    let summary = run_once(&config, source.as_ref(), &store, &notifier).await?;
    Ok(summary)
}
