use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::{Config, SourceKind};
use crate::utils::http::create_client;

mod http;
mod snapshot;

pub use http::HttpSource;
pub use snapshot::SnapshotSource;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read snapshot {path}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error {status} from {url}")]
    Status { url: String, status: StatusCode },
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
}

/// Anything that can hand back the raw listing HTML for one run.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self) -> Result<String, FetchError>;
    fn describe(&self) -> String;
}

/// Builds the source named in the configuration.
pub fn from_config(config: &Config) -> Result<Box<dyn PageSource>, FetchError> {
    match &config.source {
        SourceKind::Snapshot(path) => Ok(Box::new(SnapshotSource::new(path.clone()))),
        SourceKind::Network => {
            let client = create_client(&config.user_agent, config.http_timeout)
                .map_err(FetchError::Client)?;
            Ok(Box::new(HttpSource::new(client, config.listing_url())))
        }
    }
}
