//! News lookup: search client and the news responder.

pub mod client;
pub mod responder;

pub use client::NewsApiClient;
pub use responder::{NewsResponder, Selection};

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

use crate::error::ResponderError;

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewsArticle {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub url: String,
}

impl NewsArticle {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
        }
    }
}

/// Body of a search response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsSearch {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    /// Error text the service sends alongside a non-"ok" status.
    #[serde(default)]
    pub message: Option<String>,
}

impl NewsSearch {
    pub fn ok(articles: Vec<NewsArticle>) -> Self {
        Self {
            status: "ok".into(),
            total_results: Some(articles.len() as u64),
            articles,
            message: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Anything that can run a news search.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Search for `query`, asking for at most `page_size` articles.
    async fn search(&self, query: &str, page_size: usize) -> Result<NewsSearch, ResponderError>;
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
