use crate::config::{DiscordConfig, TelegramConfig};
use reqwest::Client;
use serde_json::json;
use teloxide::{Bot, prelude::Requester, types::ChatId};
use thiserror::Error;
use tracing::info;

const DISCORD_API_URL: &str = "https://discord.com/api/v10";

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("discord request failed: {0}")]
    Discord(#[from] reqwest::Error),
    #[error("{destination} rejected the message: {reason}")]
    Rejected { destination: String, reason: String },
}

/// A chat destination. Delivery is best effort: callers log failures and
/// move on.
#[async_trait::async_trait]
pub trait Broadcaster: Send + Sync {
    fn name(&self) -> &str;

    async fn broadcast(&self, text: &str) -> Result<(), AlertError>;
}

#[derive(Clone)]
pub struct TelegramBroadcaster {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramBroadcaster {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            bot: Bot::new(config.bot_token.clone()),
            chat_id: ChatId(config.chat_id),
        }
    }
}

#[async_trait::async_trait]
impl Broadcaster for TelegramBroadcaster {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn broadcast(&self, text: &str) -> Result<(), AlertError> {
        self.bot.send_message(self.chat_id, text).await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DiscordBroadcaster {
    client: Client,
    api_url: String,
    bot_token: String,
    channel_id: String,
}

impl DiscordBroadcaster {
    pub fn new(config: &DiscordConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: DISCORD_API_URL.to_owned(),
            bot_token: config.bot_token.clone(),
            channel_id: config.channel_id.clone(),
        }
    }
}

#[async_trait::async_trait]
impl Broadcaster for DiscordBroadcaster {
    fn name(&self) -> &str {
        "discord"
    }

    async fn broadcast(&self, text: &str) -> Result<(), AlertError> {
        let url = format!("{}/channels/{}/messages", self.api_url, self.channel_id);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(&json!({ "content": text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::Rejected {
                destination: self.name().to_owned(),
                reason: format!("{status}: {body}"),
            });
        }
        Ok(())
    }
}

/// Dry-run destination: writes every message to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogBroadcaster;

#[async_trait::async_trait]
impl Broadcaster for LogBroadcaster {
    fn name(&self) -> &str {
        "log"
    }

    async fn broadcast(&self, text: &str) -> Result<(), AlertError> {
        info!(target: "growth_agent::broadcast", "\n{text}");
        Ok(())
    }
}
