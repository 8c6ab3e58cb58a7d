//! LINE Messaging API reply client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::DispatchError;

/// Maximum characters in one text message.
pub const LINE_MAX_MESSAGE_LENGTH: usize = 5000;

/// Maximum messages in one reply call.
pub const LINE_MAX_MESSAGES_PER_REPLY: usize = 5;

/// Sends a reply tied to a one-time reply token.
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<(), DispatchError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyMessageRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage>,
}

#[derive(Debug, Serialize)]
struct TextMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

/// Client for `POST /v2/bot/message/reply`.
pub struct LineMessagingClient {
    access_token: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl LineMessagingClient {
    pub fn new(access_token: SecretString, base_url: &str, client: reqwest::Client) -> Self {
        Self {
            access_token,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn reply_url(&self) -> String {
        format!("{}/v2/bot/message/reply", self.base_url)
    }
}

#[async_trait]
impl ReplySender for LineMessagingClient {
    async fn send_reply(&self, reply_token: &str, text: &str) -> Result<(), DispatchError> {
        let request = ReplyMessageRequest {
            reply_token,
            messages: reply_messages(text),
        };

        debug!(messages = request.messages.len(), "Sending LINE reply");

        let response = self
            .client
            .post(self.reply_url())
            .bearer_auth(self.access_token.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Split reply text into at most [`LINE_MAX_MESSAGES_PER_REPLY`] messages.
fn reply_messages(text: &str) -> Vec<TextMessage> {
    let mut chunks = split_message(text, LINE_MAX_MESSAGE_LENGTH);
    if chunks.len() > LINE_MAX_MESSAGES_PER_REPLY {
        warn!(
            chunks = chunks.len(),
            "Reply too long, truncating to {LINE_MAX_MESSAGES_PER_REPLY} messages"
        );
        chunks.truncate(LINE_MAX_MESSAGES_PER_REPLY);
    }
    chunks
        .into_iter()
        .map(|text| TextMessage { kind: "text", text })
        .collect()
}

/// Split text into chunks of at most `max_chars` characters, preferring
/// newline and then space boundaries.
fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.chars().count() <= max_chars {
            chunks.push(remaining.to_string());
            break;
        }

        // Byte offset just past the first `max_chars` characters.
        let limit = remaining
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());

        let window = &remaining[..limit];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .unwrap_or(limit);

        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { limit } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}
