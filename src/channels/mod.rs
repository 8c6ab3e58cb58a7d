//! Messaging platform plumbing: inbound webhook decoding and outbound replies.

pub mod line;
pub mod line_types;
pub mod signature;

pub use line::{LineMessagingClient, ReplySender};
pub use line_types::{DecodedBatch, decode_events};
pub use signature::SignatureVerifier;
