pub mod message;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::utils::http::create_client;

pub use message::format_message;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Telegram credentials missing: {0} is empty")]
    MissingCredentials(&'static str),
    /// Carries no URL: the endpoint path embeds the bot token.
    #[error("failed to reach Telegram API")]
    Request(#[source] reqwest::Error),
    #[error("Telegram API rejected message: {status} - {body}")]
    Rejected { status: StatusCode, body: String },
}

/// Delivers one already formatted message to one chat.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError>;
}

/// Telegram Bot API `sendMessage`. A single attempt per message.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramNotifier {
    pub fn new(client: Client, api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, NotifyError> {
        let client = create_client(&config.user_agent, config.http_timeout)
            .map_err(NotifyError::Request)?;
        Ok(Self::new(
            client,
            &config.telegram.api_base,
            &config.telegram.token,
        ))
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base.trim_end_matches('/'), self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        if self.token.trim().is_empty() {
            return Err(NotifyError::MissingCredentials("TELEGRAM_TOKEN"));
        }
        if chat_id.trim().is_empty() {
            return Err(NotifyError::MissingCredentials("CHAT_ID"));
        }

        let params = [
            ("chat_id", chat_id),
            ("text", text),
            ("parse_mode", "HTML"),
            ("disable_web_page_preview", "true"),
        ];

        let response = self
            .client
            .post(self.endpoint())
            .form(&params)
            .send()
            .await
            .map_err(|e| NotifyError::Request(e.without_url()))?;

        if response.status().is_success() {
            info!("Sent Telegram notification to chat {}", chat_id);
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            error!("Telegram sendMessage failed with status {}: {}", status, body);
            Err(NotifyError::Rejected { status, body })
        }
    }
}
