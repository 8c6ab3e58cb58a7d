//! HTTP client for the news search service.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use super::{NewsSearch, NewsSource};
use crate::error::ResponderError;

const SERVICE: &str = "news";

/// News search over the `/v2/everything` endpoint.
pub struct NewsApiClient {
    api_key: Option<SecretString>,
    base_url: String,
    client: reqwest::Client,
}

impl NewsApiClient {
    pub fn new(api_key: Option<SecretString>, base_url: &str, client: reqwest::Client) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn search_url(&self) -> String {
        format!("{}/v2/everything", self.base_url)
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    async fn search(&self, query: &str, page_size: usize) -> Result<NewsSearch, ResponderError> {
        let Some(api_key) = self.api_key.as_ref() else {
            return Err(ResponderError::not_configured(SERVICE));
        };

        debug!(query, page_size, "Searching news");
        let page_size = page_size.to_string();

        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("q", query),
                ("pageSize", page_size.as_str()),
                ("apiKey", api_key.expose_secret()),
            ])
            .send()
            .await
            .map_err(|e| ResponderError::unavailable(SERVICE, e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "News search returned an error status");
            return Err(ResponderError::unavailable(
                SERVICE,
                format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()),
            ));
        }

        response
            .json::<NewsSearch>()
            .await
            .map_err(|e| ResponderError::unavailable(SERVICE, format!("invalid body: {e}")))
    }
}
