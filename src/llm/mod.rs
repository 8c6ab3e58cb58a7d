//! Generative-text integration.
//!
//! The story responder only needs "prompt in, text out", expressed by
//! [`TextGenerator`]. [`GeminiClient`] is the production backend, adapting
//! rig-core's Gemini provider.

pub mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;

use crate::error::ResponderError;

/// A service that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name used in logs and errors.
    fn name(&self) -> &str;

    /// Generate text for `prompt`. Blank output is an
    /// [`ResponderError::EmptyResult`].
    async fn generate(&self, prompt: &str) -> Result<String, ResponderError>;
}
