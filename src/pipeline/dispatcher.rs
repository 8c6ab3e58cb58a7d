//! Reply dispatcher: sends one text reply per event.

use std::sync::Arc;

use tracing::{info, warn};

use crate::channels::ReplySender;
use crate::error::DispatchError;

pub struct ReplyDispatcher {
    sender: Arc<dyn ReplySender>,
}

impl ReplyDispatcher {
    pub fn new(sender: Arc<dyn ReplySender>) -> Self {
        Self { sender }
    }

    /// Send `text` as the reply for `reply_token`.
    ///
    /// Errors are logged here and returned for counting; callers must not
    /// let them stop other events.
    pub async fn dispatch(&self, reply_token: &str, text: &str) -> Result<(), DispatchError> {
        match self.sender.send_reply(reply_token, text).await {
            Ok(()) => {
                info!(chars = text.chars().count(), "Reply sent");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to send reply");
                Err(e)
            }
        }
    }
}
