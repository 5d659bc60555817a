use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{ThreadHandle, ThreadTransport};
use crate::config::{DiscordConfig, RequestConfig};
use crate::error::{TransportError, TransportResult};

const PUBLIC_THREAD: u8 = 11;
const AUTO_ARCHIVE_MINUTES: u32 = 1440;

#[derive(Debug, Serialize)]
struct CreateThreadRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: u8,
    auto_archive_duration: u32,
}

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChannelResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    id: String,
}

/// Discord REST client for thread and message management.
pub struct DiscordTransport {
    client: Client,
    base_url: String,
    bot_token: String,
}

impl DiscordTransport {
    pub fn new(config: &DiscordConfig, request_config: &RequestConfig) -> TransportResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(request_config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
        })
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> TransportResult<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "Discord request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), %path, "Discord API error");
            return Err(TransportError::Api {
                status: status.as_u16(),
                message: text,
            });
        }
        Ok(text)
    }

    async fn put_empty(&self, path: &str) -> TransportResult<()> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .put(&url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .header("Content-Length", "0")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ThreadTransport for DiscordTransport {
    async fn create_thread(
        &self,
        channel_id: &str,
        title: &str,
        content: &str,
    ) -> TransportResult<ThreadHandle> {
        let body = CreateThreadRequest {
            name: title,
            kind: PUBLIC_THREAD,
            auto_archive_duration: AUTO_ARCHIVE_MINUTES,
        };
        let text = self
            .post_json(&format!("/channels/{}/threads", channel_id), &body)
            .await?;
        let channel: ChannelResponse =
            serde_json::from_str(&text).map_err(|e| TransportError::InvalidResponse {
                message: format!("Failed to parse thread response: {}", e),
            })?;

        let message_id = self.post_message(&channel.id, content).await?;

        // Pinning is best-effort; a missing permission should not undo
        // the thread.
        if let Err(e) = self
            .put_empty(&format!("/channels/{}/pins/{}", channel.id, message_id))
            .await
        {
            warn!(thread_id = %channel.id, error = %e, "Failed to pin starter message");
        }

        info!(thread_id = %channel.id, "Thread created");
        Ok(ThreadHandle {
            thread_id: channel.id,
            message_id: Some(message_id),
        })
    }

    async fn post_message(&self, thread_id: &str, content: &str) -> TransportResult<String> {
        let text = self
            .post_json(
                &format!("/channels/{}/messages", thread_id),
                &PostMessageRequest { content },
            )
            .await?;
        let message: MessageResponse =
            serde_json::from_str(&text).map_err(|e| TransportError::InvalidResponse {
                message: format!("Failed to parse message response: {}", e),
            })?;
        Ok(message.id)
    }

    async fn add_reaction(
        &self,
        channel_id: &str,
        message_id: &str,
        emoji: &str,
    ) -> TransportResult<()> {
        self.put_empty(&format!(
            "/channels/{}/messages/{}/reactions/{}/@me",
            channel_id,
            message_id,
            encode_emoji(emoji)
        ))
        .await
    }
}

/// Percent-encode an emoji for use in a URL path segment.
fn encode_emoji(emoji: &str) -> String {
    let mut encoded = String::with_capacity(emoji.len() * 3);
    for byte in emoji.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}
