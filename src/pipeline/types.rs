//! Shared types for the reply pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Inbound event ───────────────────────────────────────────────────

/// A text message received through the webhook, ready for routing.
///
/// Built by the webhook decoder from a platform event record; consumed once
/// by the processor and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Platform event type (always "message" for events that reach the pipeline).
    pub event_type: String,
    /// Text body of the message.
    pub message_text: String,
    /// One-time token for replying to this event.
    pub reply_token: String,
    /// Sender's user id, when the platform shares it.
    pub source_user_id: Option<String>,
    /// When the platform received the message.
    pub received_at: Option<DateTime<Utc>>,
}

impl InboundEvent {
    pub fn text(reply_token: impl Into<String>, message_text: impl Into<String>) -> Self {
        Self {
            event_type: "message".into(),
            message_text: message_text.into(),
            reply_token: reply_token.into(),
            source_user_id: None,
            received_at: None,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.source_user_id = Some(user_id.into());
        self
    }
}

// ── Intent ──────────────────────────────────────────────────────────

/// What the user is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Latest headline.
    NewsQuery,
    /// A random headline from the latest batch.
    MoreNewsQuery,
    /// An interactive story seeded by a headline.
    StoryQuery,
    /// Anything else.
    GeneralQuery,
}

impl Intent {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NewsQuery => "news",
            Self::MoreNewsQuery => "more_news",
            Self::StoryQuery => "story",
            Self::GeneralQuery => "general",
        }
    }
}

// ── Batch report ────────────────────────────────────────────────────

/// Outcome counters for one webhook batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Event records in the request body.
    pub received: usize,
    /// Text message events that went through the pipeline.
    pub handled: usize,
    /// Records that were not text messages (or failed to decode).
    pub skipped: usize,
    /// Handled events answered with fallback text.
    pub degraded: usize,
    /// Handled events whose reply could not be delivered.
    pub dispatch_failures: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_event_builder() {
        let event = InboundEvent::text("tok", "hello").with_user("U1");
        assert_eq!(event.event_type, "message");
        assert_eq!(event.reply_token, "tok");
        assert_eq!(event.message_text, "hello");
        assert_eq!(event.source_user_id.as_deref(), Some("U1"));
    }

    #[test]
    fn intent_serializes_snake_case() {
        let json = serde_json::to_string(&Intent::MoreNewsQuery).unwrap();
        assert_eq!(json, "\"more_news_query\"");
        assert_eq!(Intent::MoreNewsQuery.label(), "more_news");
    }
}
