use std::time::Duration;

use async_trait::async_trait;
use h2_core::{Error, MessageSink, Result};
use serde::{Deserialize, Serialize};

const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct GetUpdatesRequest {
    offset: i64,
    timeout: u64,
}

/// Thin client for the Bot API subset the bot uses: sending messages and
/// long-polling for updates.
pub struct TelegramApi {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl TelegramApi {
    pub fn new(token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            base_url: TELEGRAM_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }

    /// Long-poll for updates past `offset`. The HTTP timeout is padded
    /// past the poll timeout so the server side always wins.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(timeout_secs + 10))
            .json(&GetUpdatesRequest {
                offset,
                timeout: timeout_secs,
            })
            .send()
            .await?
            .json::<ApiResponse<Vec<Update>>>()
            .await?;

        if !response.ok {
            return Err(Error::Delivery(
                response
                    .description
                    .unwrap_or_else(|| "getUpdates rejected".to_string()),
            ));
        }
        Ok(response.result.unwrap_or_default())
    }
}

#[async_trait]
impl MessageSink for TelegramApi {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&SendMessageRequest { chat_id, text })
            .send()
            .await?
            .json::<ApiResponse<serde_json::Value>>()
            .await?;

        if !response.ok {
            return Err(Error::Delivery(
                response
                    .description
                    .unwrap_or_else(|| "sendMessage rejected".to_string()),
            ));
        }
        Ok(())
    }
}
