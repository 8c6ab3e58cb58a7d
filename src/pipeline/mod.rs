//! Reply pipeline.
//!
//! Every text message from a webhook batch flows through:
//! 1. `IntentClassifier::classify()`: keyword match, never fails
//! 2. A responder (news, story, or canned text): failures become fallback text
//! 3. `ReplyDispatcher::dispatch()`: one reply per event, failures are logged
//!
//! Events are handled one after another; no event can abort the rest of its batch.

pub mod dispatcher;
pub mod processor;
pub mod rules;
pub mod types;

pub use dispatcher::ReplyDispatcher;
pub use processor::EventProcessor;
pub use rules::IntentClassifier;
pub use types::{BatchReport, InboundEvent, Intent};
