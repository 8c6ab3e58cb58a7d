//! Event processor: classifies each inbound event, produces reply text,
//! and dispatches it.
//!
//! Flow per event:
//! 1. Classify the message text
//! 2. Run the matching responder; a typed failure is replaced by its fallback text
//! 3. Dispatch the reply with the event's reply token

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{error, info, warn};

use crate::channels::DecodedBatch;
use crate::config::GeneralReplyMode;
use crate::error::{ResponderError, ResponderFailure};
use crate::news::responder::NO_NEWS_MESSAGE;
use crate::news::{NewsResponder, Selection};
use crate::pipeline::dispatcher::ReplyDispatcher;
use crate::pipeline::rules::IntentClassifier;
use crate::pipeline::types::{BatchReport, InboundEvent, Intent};
use crate::story::{STORY_FALLBACK_MESSAGE, StoryMode, StoryResponder};

/// Reply for messages that match no keyword.
pub const GENERAL_HELP_MESSAGE: &str = "請問你想了解什麼？可以說「新聞」、「更多」或「故事」。";

/// What happened to a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventOutcome {
    pub intent: Intent,
    /// Text handed to the dispatcher.
    pub reply: String,
    /// Responder failure that was replaced by fallback text, if any.
    pub degraded: Option<ResponderError>,
    pub delivered: bool,
}

pub struct EventProcessor {
    classifier: IntentClassifier,
    news: Arc<NewsResponder>,
    story: Arc<StoryResponder>,
    dispatcher: ReplyDispatcher,
    news_query: String,
    general_mode: GeneralReplyMode,
}

impl EventProcessor {
    pub fn new(
        classifier: IntentClassifier,
        news: Arc<NewsResponder>,
        story: Arc<StoryResponder>,
        dispatcher: ReplyDispatcher,
        news_query: impl Into<String>,
        general_mode: GeneralReplyMode,
    ) -> Self {
        Self {
            classifier,
            news,
            story,
            dispatcher,
            news_query: news_query.into(),
            general_mode,
        }
    }

    /// Produce reply text for an already classified event.
    pub async fn respond(
        &self,
        intent: Intent,
        event: &InboundEvent,
    ) -> Result<String, ResponderFailure> {
        let user_id = event.source_user_id.as_deref();
        match intent {
            Intent::NewsQuery => self.news.respond(&self.news_query, Selection::First).await,
            Intent::MoreNewsQuery => self.news.respond(&self.news_query, Selection::Random).await,
            Intent::StoryQuery => self.story.respond(StoryMode::NewsSeeded, user_id).await,
            Intent::GeneralQuery => match self.general_mode {
                GeneralReplyMode::Canned => Ok(GENERAL_HELP_MESSAGE.to_string()),
                GeneralReplyMode::Chat => {
                    self.story
                        .respond(StoryMode::Direct(&event.message_text), user_id)
                        .await
                }
            },
        }
    }

    /// Run one event through classify → respond → dispatch.
    pub async fn handle(&self, event: &InboundEvent) -> EventOutcome {
        let intent = self.classifier.classify(&event.message_text);
        info!(
            intent = intent.label(),
            user_id = event.source_user_id.as_deref(),
            "Handling text message"
        );

        // A panicking responder is contained like any other responder failure.
        let result = AssertUnwindSafe(self.respond(intent, event))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                error!(intent = intent.label(), "Responder panicked");
                Err(ResponderFailure::new(
                    ResponderError::unavailable(intent.label(), "responder panicked"),
                    fallback_for(intent),
                ))
            });

        let (reply, degraded) = match result {
            Ok(text) => (text, None),
            Err(failure) => {
                warn!(
                    intent = intent.label(),
                    cause = %failure.cause,
                    "Responder failed, replying with fallback"
                );
                (failure.fallback, Some(failure.cause))
            }
        };

        let delivered = self
            .dispatcher
            .dispatch(&event.reply_token, &reply)
            .await
            .is_ok();

        EventOutcome {
            intent,
            reply,
            degraded,
            delivered,
        }
    }

    /// Process every event of a decoded batch, in order.
    ///
    /// Each event is isolated: responder and dispatch failures are recorded
    /// in the report and processing moves on to the next event.
    pub async fn process_batch(&self, batch: DecodedBatch) -> BatchReport {
        let mut report = BatchReport {
            received: batch.received,
            skipped: batch.skipped(),
            ..BatchReport::default()
        };

        for event in &batch.events {
            let outcome = self.handle(event).await;
            report.handled += 1;
            if outcome.degraded.is_some() {
                report.degraded += 1;
            }
            if !outcome.delivered {
                report.dispatch_failures += 1;
            }
        }

        info!(
            received = report.received,
            handled = report.handled,
            skipped = report.skipped,
            degraded = report.degraded,
            dispatch_failures = report.dispatch_failures,
            "Webhook batch processed"
        );
        report
    }
}

/// Fallback text used when a responder could not even report its failure.
fn fallback_for(intent: Intent) -> &'static str {
    match intent {
        Intent::NewsQuery | Intent::MoreNewsQuery => NO_NEWS_MESSAGE,
        Intent::StoryQuery => STORY_FALLBACK_MESSAGE,
        Intent::GeneralQuery => GENERAL_HELP_MESSAGE,
    }
}
