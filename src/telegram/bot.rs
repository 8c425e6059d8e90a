use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::dispatch::{ChatMessage, Outbound};
use crate::pairing::UserId;

use super::types::{ApiResponse, Update};

// getUpdates long-polls server-side for this many seconds
const POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("telegram api error: {0}")]
    Api(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Thin client for the handful of Bot API methods we call.
pub struct Bot {
    http: reqwest::Client,
    base: String,
}

impl Bot {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: format!("https://api.telegram.org/bot{token}"),
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
        timeout: Duration,
    ) -> Result<T, SendError> {
        let response: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.base, method))
            .timeout(timeout)
            .json(&payload)
            .send()
            .await?
            .json()
            .await?;

        if !response.ok {
            return Err(SendError::Api(
                response.description.unwrap_or_else(|| "unknown".into()),
            ));
        }

        response
            .result
            .ok_or_else(|| SendError::Api("response missing result".into()))
    }

    async fn send(&self, method: &str, payload: serde_json::Value) -> Result<(), SendError> {
        self.call::<serde_json::Value>(method, payload, Duration::from_secs(10))
            .await?;
        Ok(())
    }

    /// Fetch updates after `offset`, blocking server-side until some arrive.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, SendError> {
        self.call(
            "getUpdates",
            json!({
                "offset": offset,
                "timeout": POLL_TIMEOUT_SECS,
                "allowed_updates": ["message"],
            }),
            // outlive telegram's server-side long-poll
            Duration::from_secs(POLL_TIMEOUT_SECS + 5),
        )
        .await
    }

    pub async fn set_webhook(&self, url: &str) -> Result<(), SendError> {
        self.call::<serde_json::Value>(
            "setWebhook",
            json!({ "url": url, "allowed_updates": ["message"] }),
            Duration::from_secs(10),
        )
        .await?;
        Ok(())
    }

    /// Telegram rejects getUpdates while a webhook is registered.
    pub async fn delete_webhook(&self) -> Result<(), SendError> {
        self.call::<serde_json::Value>("deleteWebhook", json!({}), Duration::from_secs(10))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Outbound for Bot {
    async fn send_notice(&self, to: UserId, text: &str) -> Result<(), SendError> {
        self.send("sendMessage", json!({ "chat_id": to, "text": text }))
            .await
    }

    async fn send_content(&self, to: UserId, message: &ChatMessage) -> Result<(), SendError> {
        match message {
            ChatMessage::Text(text) => {
                self.send("sendMessage", json!({ "chat_id": to, "text": text }))
                    .await
            }
            ChatMessage::Sticker { file_id } => {
                self.send("sendSticker", json!({ "chat_id": to, "sticker": file_id }))
                    .await
            }
            ChatMessage::Photo { file_id, caption } => {
                let mut payload = json!({ "chat_id": to, "photo": file_id });
                if let Some(caption) = caption {
                    payload["caption"] = json!(caption);
                }
                self.send("sendPhoto", payload).await
            }
            ChatMessage::Document { file_id, caption } => {
                let mut payload = json!({ "chat_id": to, "document": file_id });
                if let Some(caption) = caption {
                    payload["caption"] = json!(caption);
                }
                self.send("sendDocument", payload).await
            }
        }
    }
}
