use anyhow::{Context, Result};
use std::fs;

use slot_watch::config::Config;
use slot_watch::models::EntityKey;
use slot_watch::parsers::extract_rows;
use slot_watch::source;

/// Print what the extractor sees in a page, either a local file given as the
/// first argument or the configured source.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::load().ok();

    let html = match std::env::args().nth(1) {
        Some(path) => {
            println!("Reading {}...", path);
            fs::read_to_string(&path).with_context(|| format!("Failed to read {path}"))?
        }
        None => {
            let config = config
                .as_ref()
                .context("No file given and configuration is incomplete")?;
            let source = source::from_config(config)?;
            println!("Fetching {}...", source.describe());
            source.fetch().await?
        }
    };

    let extraction = extract_rows(&html)?;
    println!("Layout: {:?}", extraction.layout);
    println!("Found {} rows", extraction.rows.len());

    for row in &extraction.rows {
        let key = EntityKey::from_raw(&row.name);
        let status = if row.status.is_empty() { "(empty)" } else { row.status.as_str() };
        println!("  {:<30} [{}] -> {}", row.name, key, status);
    }

    if let Some(config) = config {
        for target in &config.targets {
            let hit = extraction.rows.iter().any(|row| row.key() == target.key);
            println!("Tracked {:<20} {}", target.name, if hit { "found" } else { "MISSING" });
        }
    }

    Ok(())
}
