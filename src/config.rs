use ::config::{Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::detector::{MatchMode, NotifyPolicy, StatePersistence};
use crate::models::TrackedEntity;
use crate::parsers::{Sentinels, DEFAULT_UNAVAILABLE, DEFAULT_WAITLIST};
use crate::utils::http::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

pub const DEFAULT_BASE_URL: &str = "https://schengenappointments.com";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
pub const DEFAULT_STATE_FILE: &str = "last_state.json";
pub const DEFAULT_SNAPSHOT: &str = "rendered.html";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration")]
    Source(#[from] ::config::ConfigError),
    #[error("missing required setting {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
    #[error("STATE_PERSISTENCE=skip requires NOTIFY_POLICY=level")]
    SkipRequiresLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Network,
    Snapshot(PathBuf),
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub locality: String,
    pub category: String,
    pub targets: Vec<TrackedEntity>,
    pub telegram: TelegramConfig,
    pub state_file: PathBuf,
    pub source: SourceKind,
    pub base_url: Url,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub policy: NotifyPolicy,
    pub persistence: StatePersistence,
    pub match_mode: MatchMode,
    pub sentinels: Sentinels,
}

/// Raw settings as they arrive from `slot_watch.toml` and the environment.
/// Field names are the lower-cased environment variable names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub city_slug: Option<String>,
    pub visa_type: Option<String>,
    pub target_country: Option<String>,
    pub target_countries: Option<String>,
    pub telegram_token: Option<String>,
    pub chat_id: Option<String>,
    pub state_file: Option<String>,
    pub source: Option<String>,
    pub snapshot_path: Option<String>,
    pub notify_policy: Option<String>,
    pub state_persistence: Option<String>,
    pub match_mode: Option<String>,
    pub unavailable_text: Option<String>,
    pub waitlist_text: Option<String>,
    pub base_url: Option<String>,
    pub telegram_api_base: Option<String>,
    pub http_timeout_secs: Option<String>,
    pub user_agent: Option<String>,
}

impl Config {
    /// Optional `slot_watch.toml` in the working directory, then environment.
    pub fn load() -> Result<Self, ConfigError> {
        let settings: Settings = ::config::Config::builder()
            .add_source(File::with_name("slot_watch").required(false))
            .add_source(Environment::default())
            .build()?
            .try_deserialize()?;

        Self::from_settings(settings)
    }

    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let locality = required(settings.city_slug, "CITY_SLUG")?;
        let category = required(settings.visa_type, "VISA_TYPE")?;
        let targets = parse_targets(
            settings.target_country.as_deref(),
            settings.target_countries.as_deref(),
        )?;

        let policy = match non_empty(settings.notify_policy).as_deref() {
            None | Some("edge") => NotifyPolicy::EdgeTriggered,
            Some("level") => NotifyPolicy::LevelTriggered,
            Some(other) => return Err(invalid("NOTIFY_POLICY", other)),
        };

        let persistence = match non_empty(settings.state_persistence).as_deref() {
            None | Some("always") => StatePersistence::Always,
            Some("skip") => StatePersistence::Skip,
            Some(other) => return Err(invalid("STATE_PERSISTENCE", other)),
        };
        if persistence == StatePersistence::Skip && policy != NotifyPolicy::LevelTriggered {
            return Err(ConfigError::SkipRequiresLevel);
        }

        let match_mode = match non_empty(settings.match_mode).as_deref() {
            None if targets.len() == 1 => MatchMode::Strict,
            None => MatchMode::Tolerant,
            Some("strict") => MatchMode::Strict,
            Some("tolerant") => MatchMode::Tolerant,
            Some(other) => return Err(invalid("MATCH_MODE", other)),
        };

        let source = match non_empty(settings.source).as_deref() {
            None | Some("network") => SourceKind::Network,
            Some("snapshot") => SourceKind::Snapshot(PathBuf::from(
                non_empty(settings.snapshot_path).unwrap_or_else(|| DEFAULT_SNAPSHOT.to_string()),
            )),
            Some(other) => return Err(invalid("SOURCE", other)),
        };

        let base_raw = non_empty(settings.base_url).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = match Url::parse(&base_raw) {
            Ok(url) if !url.cannot_be_a_base() => url,
            _ => return Err(invalid("BASE_URL", &base_raw)),
        };

        let http_timeout = match non_empty(settings.http_timeout_secs) {
            None => DEFAULT_TIMEOUT,
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(invalid("HTTP_TIMEOUT_SECS", &raw)),
            },
        };

        Ok(Config {
            locality,
            category,
            targets,
            telegram: TelegramConfig {
                token: settings.telegram_token.unwrap_or_default().trim().to_string(),
                chat_id: settings.chat_id.unwrap_or_default().trim().to_string(),
                api_base: non_empty(settings.telegram_api_base)
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API.to_string()),
            },
            state_file: PathBuf::from(
                non_empty(settings.state_file).unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
            ),
            source,
            base_url,
            user_agent: non_empty(settings.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            http_timeout,
            policy,
            persistence,
            match_mode,
            sentinels: Sentinels {
                unavailable: settings
                    .unavailable_text
                    .unwrap_or_else(|| DEFAULT_UNAVAILABLE.to_string()),
                waitlist: settings
                    .waitlist_text
                    .unwrap_or_else(|| DEFAULT_WAITLIST.to_string()),
            },
        })
    }

    /// `<base_url>/in/<locality>/<category>`, segments percent-encoded.
    pub fn listing_url(&self) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["in", self.locality.as_str(), self.category.as_str()]);
        }
        url
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::Missing(key))
}

fn invalid(key: &'static str, value: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
    }
}

/// Single and comma-separated forms are merged; duplicates by key are dropped.
fn parse_targets(
    single: Option<&str>,
    list: Option<&str>,
) -> Result<Vec<TrackedEntity>, ConfigError> {
    let mut targets: Vec<TrackedEntity> = Vec::new();

    let names = single
        .into_iter()
        .chain(list.into_iter().flat_map(|l| l.split(',')))
        .map(str::trim)
        .filter(|name| !name.is_empty());

    for name in names {
        let entity = TrackedEntity::new(name);
        if entity.key.is_empty() {
            return Err(invalid("TARGET_COUNTRIES", name));
        }
        if !targets.iter().any(|t| t.key == entity.key) {
            targets.push(entity);
        }
    }

    if targets.is_empty() {
        return Err(ConfigError::Missing("TARGET_COUNTRY"));
    }
    Ok(targets)
}
