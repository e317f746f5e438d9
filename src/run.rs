use chrono::Local;
use thiserror::Error;
use tracing::info;

use crate::config::Config;
use crate::detector::{DetectError, Detector};
use crate::parsers::{extract_rows, ExtractError};
use crate::source::{FetchError, PageSource};
use crate::storage::{StateStore, StorageError};
use crate::telegram::{format_message, Notifier, NotifyError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Detect(#[from] DetectError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub found: usize,
    pub notified: usize,
    pub state_written: bool,
}

/// One complete check: fetch, extract, detect, notify, persist.
///
/// Any error aborts before the state is written, so a failed alert is
/// re-evaluated on the next scheduled run.
pub async fn run_once(
    config: &Config,
    source: &dyn PageSource,
    store: &dyn StateStore,
    notifier: &dyn Notifier,
) -> Result<RunSummary, RunError> {
    let mut state = store.load().await;

    info!("Checking {} via {}", config.listing_url(), source.describe());
    let html = source.fetch().await?;

    let extraction = extract_rows(&html)?;
    info!(
        "Extracted {} rows using {:?} layout",
        extraction.rows.len(),
        extraction.layout
    );

    let detector = Detector::from_config(config);
    let source_url = config.listing_url().to_string();
    let evaluation = detector.evaluate(&config.targets, &extraction.rows, &mut state, &source_url)?;

    for event in &evaluation.events {
        let text = format_message(event, &config.locality, &config.category, Local::now());
        notifier.send(&config.telegram.chat_id, &text).await?;
        info!("Notified {}: {}", event.entity, event.status);
    }

    if evaluation.state_changed {
        store.save(&state).await?;
    }

    let summary = RunSummary {
        rows: extraction.rows.len(),
        found: evaluation.found(),
        notified: evaluation.events.len(),
        state_written: evaluation.state_changed,
    };
    info!(
        "Run complete: {} rows, {}/{} tracked found, {} notified",
        summary.rows,
        summary.found,
        config.targets.len(),
        summary.notified
    );
    Ok(summary)
}
