use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
pub fn init() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("slot_watch=info".parse()?);

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}
