//! Telegram Bot API transport implementation

use super::{ChatId, CommandSpec, Inbound, Transport};
use crate::config::TransportConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// Telegram Bot API base URL
const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Delay before retrying a failed getUpdates poll
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Envelope around every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: ChatId,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: ChatId,
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SetMyCommandsRequest<'a> {
    commands: Vec<BotCommand<'a>>,
}

#[derive(Debug, Serialize)]
struct BotCommand<'a> {
    command: &'a str,
    description: &'a str,
}

/// Long-polling Telegram transport
#[derive(Clone)]
pub struct TelegramTransport {
    client: Client,
    base_url: String,
    poll_timeout_secs: u64,
}

impl TelegramTransport {
    /// Create a new transport for the configured bot token
    pub fn new(config: &TransportConfig) -> Self {
        Self::with_base_url(config, TELEGRAM_API_URL)
    }

    /// Create a transport against a custom API host
    pub fn with_base_url(config: &TransportConfig, base_url: &str) -> Self {
        // The HTTP timeout must outlive the long-poll window.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: format!("{}/bot{}", base_url, config.token),
            poll_timeout_secs: config.poll_timeout_secs,
        }
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &impl Serialize,
    ) -> anyhow::Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self.client.post(&url).json(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Bot API error: {} - {}", status, body);
        }

        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.ok {
            anyhow::bail!(
                "Bot API rejected {}: {}",
                method,
                envelope.description.unwrap_or_default()
            );
        }

        envelope
            .result
            .ok_or_else(|| anyhow::anyhow!("Bot API returned ok without a result"))
    }

    async fn get_updates(&self, offset: i64) -> anyhow::Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
            }),
        )
        .await
    }

    /// Run the long-poll loop, forwarding text messages until the receiver drops
    async fn run_poll_loop(self, tx: mpsc::Sender<Inbound>) {
        let mut offset = 0i64;

        loop {
            match self.get_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);

                        let Some(message) = update.message else { continue };
                        let Some(text) = message.text else { continue };

                        let inbound = Inbound {
                            chat_id: message.chat.id,
                            text,
                        };
                        if tx.send(inbound).await.is_err() {
                            tracing::debug!("Update receiver dropped, stopping poller");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "getUpdates failed, backing off");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    if tx.is_closed() {
                        return;
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn updates(&self) -> anyhow::Result<mpsc::Receiver<Inbound>> {
        let (tx, rx) = mpsc::channel(1024);
        let poller = self.clone();

        tokio::spawn(async move {
            poller.run_poll_loop(tx).await;
        });

        Ok(rx)
    }

    async fn send(&self, chat_id: ChatId, text: &str) -> anyhow::Result<()> {
        let _: Message = self
            .call("sendMessage", &SendMessageRequest { chat_id, text })
            .await?;
        Ok(())
    }

    async fn set_commands(&self, commands: &[CommandSpec]) -> anyhow::Result<()> {
        let request = SetMyCommandsRequest {
            commands: commands
                .iter()
                .map(|spec| BotCommand {
                    command: spec.command,
                    description: spec.description,
                })
                .collect(),
        };
        let _: bool = self.call("setMyCommands", &request).await?;
        Ok(())
    }
}
