use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use super::{FetchError, PageSource};

/// Live listing page. One attempt per run; the scheduler owns retries.
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self) -> Result<String, FetchError> {
        let url = self.url.as_str();
        info!("Fetching {}", url);

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP error {}: {}", status, url);
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
