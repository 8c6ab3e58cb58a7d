//! Webhook payload types and decoding into [`InboundEvent`]s.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::WebhookError;
use crate::pipeline::types::InboundEvent;

/// Request body envelope.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    /// Raw records; each one is decoded separately so a single odd event
    /// cannot reject the whole batch.
    pub events: Vec<serde_json::Value>,
}

/// A single event record.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message(MessageEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub message: MessageContent,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Text message events decoded from one request.
#[derive(Debug, Default)]
pub struct DecodedBatch {
    /// Number of records in the body.
    pub received: usize,
    /// Text message events, in body order.
    pub events: Vec<InboundEvent>,
}

impl DecodedBatch {
    pub fn skipped(&self) -> usize {
        self.received.saturating_sub(self.events.len())
    }
}

impl WebhookEvent {
    /// Convert into an [`InboundEvent`] if this is a repliable text message.
    pub fn into_text_event(self) -> Option<InboundEvent> {
        let WebhookEvent::Message(event) = self else {
            return None;
        };
        let MessageContent::Text { text } = event.message else {
            return None;
        };
        let reply_token = event.reply_token.filter(|t| !t.is_empty())?;

        Some(InboundEvent {
            event_type: "message".into(),
            message_text: text,
            reply_token,
            source_user_id: event.source.and_then(|s| s.user_id),
            received_at: event.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis),
        })
    }
}

/// Decode a (verified) request body.
pub fn decode_events(body: &[u8]) -> Result<DecodedBatch, WebhookError> {
    let payload: WebhookPayload = serde_json::from_slice(body)
        .map_err(|e| WebhookError::MalformedPayload(e.to_string()))?;

    let received = payload.events.len();
    debug!(
        destination = payload.destination.as_deref().unwrap_or("-"),
        received, "Decoding webhook events"
    );
    let events = payload
        .events
        .into_iter()
        .enumerate()
        .filter_map(|(i, raw)| match serde_json::from_value::<WebhookEvent>(raw) {
            Ok(event) => {
                let text_event = event.into_text_event();
                if text_event.is_none() {
                    debug!(index = i, "Skipping non-text event");
                }
                text_event
            }
            Err(e) => {
                debug!(index = i, error = %e, "Skipping undecodable event");
                None
            }
        })
        .collect();

    Ok(DecodedBatch { received, events })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_event(token: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "type": "message",
            "mode": "active",
            "timestamp": 1_700_000_000_000i64,
            "source": {"type": "user", "userId": "U123"},
            "webhookEventId": "01H",
            "deliveryContext": {"isRedelivery": false},
            "replyToken": token,
            "message": {"id": "1", "type": "text", "quoteToken": "q", "text": text}
        })
    }

    fn body(events: Vec<serde_json::Value>) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({"destination": "Uabc", "events": events})).unwrap()
    }

    #[test]
    fn decodes_text_message() {
        let batch = decode_events(&body(vec![text_event("tok-1", "新聞")])).unwrap();
        assert_eq!(batch.received, 1);
        assert_eq!(batch.events.len(), 1);
        let event = &batch.events[0];
        assert_eq!(event.event_type, "message");
        assert_eq!(event.reply_token, "tok-1");
        assert_eq!(event.message_text, "新聞");
        assert_eq!(event.source_user_id.as_deref(), Some("U123"));
        assert_eq!(
            event.received_at.unwrap().timestamp_millis(),
            1_700_000_000_000
        );
    }

    #[test]
    fn skips_non_text_and_non_message_events() {
        let sticker = serde_json::json!({
            "type": "message",
            "replyToken": "tok-s",
            "source": {"type": "user", "userId": "U1"},
            "message": {"id": "2", "type": "sticker", "packageId": "1", "stickerId": "1"}
        });
        let follow = serde_json::json!({
            "type": "follow",
            "replyToken": "tok-f",
            "source": {"type": "user", "userId": "U1"}
        });
        let batch = decode_events(&body(vec![
            sticker,
            text_event("tok-1", "hi"),
            follow,
            text_event("tok-2", "故事"),
        ]))
        .unwrap();

        assert_eq!(batch.received, 4);
        assert_eq!(batch.skipped(), 2);
        let tokens: Vec<_> = batch.events.iter().map(|e| e.reply_token.as_str()).collect();
        assert_eq!(tokens, vec!["tok-1", "tok-2"]);
    }

    #[test]
    fn skips_malformed_event_records() {
        let broken = serde_json::json!({"type": "message", "replyToken": "x"});
        let batch = decode_events(&body(vec![broken, text_event("tok", "ok")])).unwrap();
        assert_eq!(batch.received, 2);
        assert_eq!(batch.events.len(), 1);
    }

    #[test]
    fn skips_text_without_reply_token() {
        let mut event = text_event("", "hello");
        event.as_object_mut().unwrap().remove("replyToken");
        let batch = decode_events(&body(vec![event])).unwrap();
        assert!(batch.events.is_empty());
    }

    #[test]
    fn empty_event_list_is_valid() {
        // The platform sends this when verifying the webhook URL.
        let batch = decode_events(&body(vec![])).unwrap();
        assert_eq!(batch.received, 0);
        assert!(batch.events.is_empty());
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert!(matches!(
            decode_events(b"not json"),
            Err(WebhookError::MalformedPayload(_))
        ));
    }

    #[test]
    fn skipped_never_underflows() {
        let batch = DecodedBatch {
            received: 0,
            events: vec![InboundEvent::text("tok", "hi")],
        };
        assert_eq!(batch.skipped(), 0);
    }

    #[test]
    fn missing_events_field_is_malformed() {
        assert!(decode_events(br#"{"destination":"U"}"#).is_err());
    }
}
