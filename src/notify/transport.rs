//! Telegram Bot API transport

use serde::Deserialize;
use tracing::debug;

use crate::errors::{NotifyError, NotifyResult};

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Markdown,
    Html,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
        }
    }
}

/// Seam over the chat backend: one fallible send-text-message operation.
#[allow(async_fn_in_trait)]
pub trait MessageTransport {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: ParseMode,
    ) -> NotifyResult<()>;
}

pub struct TelegramTransport {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramTransport {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(token, TELEGRAM_API_BASE)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            base_url: base_url.into(),
        }
    }
}

impl MessageTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        parse_mode: ParseMode,
    ) -> NotifyResult<()> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let payload = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": parse_mode.as_str(),
        });

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                description: "request to Telegram API failed".to_string(),
                status: None,
                source: Some(e.into()),
            })?;

        let status = response.status();
        let body: ApiResponse = response.json().await.map_err(|e| NotifyError::Transport {
            description: format!("undecodable Telegram API response (HTTP {})", status.as_u16()),
            status: Some(status.as_u16()),
            source: Some(e.into()),
        })?;

        if body.ok {
            debug!("Telegram API accepted message for chat {}", chat_id);
            Ok(())
        } else {
            Err(NotifyError::Transport {
                description: body
                    .description
                    .unwrap_or_else(|| format!("Telegram API returned ok=false (HTTP {})", status)),
                status: Some(status.as_u16()),
                source: None,
            })
        }
    }
}
