//! Gemini backend built on rig-core's Gemini provider.

use std::time::Duration;

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::gemini;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use super::TextGenerator;
use crate::error::{ConfigError, ResponderError};

const SERVICE: &str = "gemini";

pub struct GeminiClient {
    /// `None` when no API key is configured.
    client: Option<gemini::Client>,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<&SecretString>,
        base_url: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        let client = match api_key {
            Some(key) => Some(
                gemini::Client::builder()
                    .api_key(key.expose_secret())
                    .base_url(base_url.trim_end_matches('/'))
                    .build()
                    .map_err(|e| {
                        ConfigError::HttpClient(format!("Failed to create Gemini client: {e}"))
                    })?,
            ),
            None => None,
        };

        Ok(Self {
            client,
            model: model.to_string(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn generate(&self, prompt: &str) -> Result<String, ResponderError> {
        let Some(client) = self.client.as_ref() else {
            return Err(ResponderError::not_configured(SERVICE));
        };

        info!(model = %self.model, prompt_chars = prompt.chars().count(), "Generating text");

        let agent = client.agent(self.model.as_str()).build();
        let text = tokio::time::timeout(self.timeout, agent.prompt(prompt.to_string()))
            .await
            .map_err(|_| ResponderError::unavailable(SERVICE, "request timed out"))?
            .map_err(|e| ResponderError::unavailable(SERVICE, e.to_string()))?;

        debug!(chars = text.chars().count(), "Gemini response received");

        if text.trim().is_empty() {
            return Err(ResponderError::empty(SERVICE));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_URL: &str = "https://generativelanguage.googleapis.com";

    #[test]
    fn key_constructs_client() {
        let key = SecretString::from("test-key");
        let client =
            GeminiClient::new(Some(&key), BASE_URL, "gemini-1.5-flash", Duration::from_secs(5))
                .unwrap();
        assert!(client.client.is_some());
        assert_eq!(client.model(), "gemini-1.5-flash");
        assert_eq!(client.name(), "gemini");
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let client =
            GeminiClient::new(None, BASE_URL, "gemini-1.5-flash", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.generate("hi").await.unwrap_err(),
            ResponderError::not_configured("gemini")
        );
    }
}
