//! News responder: turns a search into a single formatted headline.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use super::{NewsArticle, NewsSource};
use crate::config::IndexBoundMode;
use crate::error::{ResponderError, ResponderFailure};

/// Reply sent when no article can be shown.
pub const NO_NEWS_MESSAGE: &str = "目前沒有相關新聞。";

const SERVICE: &str = "news";

/// Draws an index in `0..bound`. `bound` is always at least 1.
pub type IndexPicker = Arc<dyn Fn(usize) -> usize + Send + Sync>;

/// Thread-local RNG picker used outside of tests.
pub fn random_index_picker() -> IndexPicker {
    Arc::new(|bound: usize| rand::thread_rng().gen_range(0..bound))
}

/// Which article of a result set to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    First,
    Random,
}

/// Render an article with the fixed reply template.
pub fn format_article(article: &NewsArticle) -> String {
    format!(
        "最新新聞：\n\n標題: {}\n描述: {}\n\n更多詳情: {}",
        article.title, article.description, article.url
    )
}

/// Bounds-checked lookup of a selected index.
pub fn article_at(articles: &[NewsArticle], index: usize) -> Result<&NewsArticle, ResponderError> {
    articles
        .get(index)
        .ok_or(ResponderError::OutOfRangeSelection {
            index,
            len: articles.len(),
        })
}

/// Fetches news and renders one article as reply text.
pub struct NewsResponder {
    source: Arc<dyn NewsSource>,
    page_size: usize,
    index_bound: IndexBoundMode,
    picker: IndexPicker,
}

impl NewsResponder {
    pub fn new(source: Arc<dyn NewsSource>, page_size: usize, index_bound: IndexBoundMode) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            index_bound,
            picker: random_index_picker(),
        }
    }

    /// Replace the random index source.
    pub fn with_index_picker(mut self, picker: IndexPicker) -> Self {
        self.picker = picker;
        self
    }

    /// Search and return the usable articles, in service order.
    pub async fn fetch(&self, query: &str) -> Result<Vec<NewsArticle>, ResponderError> {
        let search = self.source.search(query, self.page_size).await?;

        if !search.is_ok() {
            return Err(ResponderError::unavailable(
                SERVICE,
                format!(
                    "status '{}': {}",
                    search.status,
                    search.message.as_deref().unwrap_or("no message")
                ),
            ));
        }
        if search.articles.is_empty() {
            return Err(ResponderError::empty(SERVICE));
        }

        debug!(
            query,
            count = search.articles.len(),
            total = ?search.total_results,
            "News search succeeded"
        );
        Ok(search.articles)
    }

    /// Pick one article according to `selection`.
    ///
    /// With [`IndexBoundMode::Expected`] the random index ranges over the
    /// requested page size, so it can land past the end of a short result
    /// set. That case is an [`ResponderError::OutOfRangeSelection`].
    pub fn select<'a>(
        &self,
        articles: &'a [NewsArticle],
        selection: Selection,
    ) -> Result<&'a NewsArticle, ResponderError> {
        let index = match selection {
            Selection::First => 0,
            Selection::Random => {
                let bound = match self.index_bound {
                    IndexBoundMode::Actual => articles.len(),
                    IndexBoundMode::Expected => self.page_size,
                };
                if bound == 0 {
                    return Err(ResponderError::empty(SERVICE));
                }
                (self.picker)(bound)
            }
        };
        article_at(articles, index).inspect_err(|e| warn!(error = %e, "Article selection failed"))
    }

    /// Search and return the selected article.
    pub async fn pick_article(
        &self,
        query: &str,
        selection: Selection,
    ) -> Result<NewsArticle, ResponderError> {
        let articles = self.fetch(query).await?;
        self.select(&articles, selection).cloned()
    }

    /// Produce the news reply for `query`.
    pub async fn respond(
        &self,
        query: &str,
        selection: Selection,
    ) -> Result<String, ResponderFailure> {
        match self.pick_article(query, selection).await {
            Ok(article) => {
                info!(title = %article.title, ?selection, "Selected news article");
                Ok(format_article(&article))
            }
            Err(cause) => Err(ResponderFailure::new(cause, NO_NEWS_MESSAGE)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::news::NewsSearch;

    /// Stub news source returning a canned result.
    pub(crate) struct StubNews {
        pub result: Result<NewsSearch, ResponderError>,
        pub calls: AtomicUsize,
        pub last_query: Mutex<Option<String>>,
    }

    impl StubNews {
        pub(crate) fn new(result: Result<NewsSearch, ResponderError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl NewsSource for StubNews {
        async fn search(
            &self,
            query: &str,
            _page_size: usize,
        ) -> Result<NewsSearch, ResponderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.to_string());
            self.result.clone()
        }
    }

    pub(crate) fn articles(n: usize) -> Vec<NewsArticle> {
        (0..n)
            .map(|i| {
                NewsArticle::new(
                    format!("Title {i}"),
                    format!("Description {i}"),
                    format!("https://news.example/{i}"),
                )
            })
            .collect()
    }

    fn fixed(index: usize) -> IndexPicker {
        Arc::new(move |_: usize| index)
    }

    #[tokio::test]
    async fn first_article_is_formatted_with_labels() {
        let source = StubNews::new(Ok(NewsSearch::ok(articles(3))));
        let responder = NewsResponder::new(source.clone(), 20, IndexBoundMode::Actual);

        let reply = responder.respond("equality", Selection::First).await.unwrap();

        assert!(reply.starts_with("最新新聞："));
        assert!(reply.contains("標題: Title 0"));
        assert!(reply.contains("描述: Description 0"));
        assert!(reply.contains("更多詳情: https://news.example/0"));
        assert_eq!(source.last_query.lock().unwrap().as_deref(), Some("equality"));
    }

    #[tokio::test]
    async fn random_selection_uses_picker() {
        let source = StubNews::new(Ok(NewsSearch::ok(articles(3))));
        let responder = NewsResponder::new(source, 20, IndexBoundMode::Actual)
            .with_index_picker(fixed(2));

        let reply = responder.respond("q", Selection::Random).await.unwrap();
        assert!(reply.contains("標題: Title 2"));
    }

    #[tokio::test]
    async fn actual_bound_passes_real_count_to_picker() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_picker = Arc::clone(&seen);
        let source = StubNews::new(Ok(NewsSearch::ok(articles(4))));
        let responder = NewsResponder::new(source, 20, IndexBoundMode::Actual)
            .with_index_picker(Arc::new(move |bound: usize| {
                seen_in_picker.store(bound, Ordering::SeqCst);
                bound - 1
            }));

        let reply = responder.respond("q", Selection::Random).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 4);
        assert!(reply.contains("Title 3"));
    }

    #[tokio::test]
    async fn expected_bound_passes_page_size_to_picker() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_in_picker = Arc::clone(&seen);
        let source = StubNews::new(Ok(NewsSearch::ok(articles(2))));
        let responder = NewsResponder::new(source, 10, IndexBoundMode::Expected)
            .with_index_picker(Arc::new(move |bound: usize| {
                seen_in_picker.store(bound, Ordering::SeqCst);
                0
            }));

        responder.respond("q", Selection::Random).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn out_of_range_index_falls_back_to_no_news() {
        let source = StubNews::new(Ok(NewsSearch::ok(articles(2))));
        let responder = NewsResponder::new(source, 10, IndexBoundMode::Expected)
            .with_index_picker(fixed(7));

        let failure = responder.respond("q", Selection::Random).await.unwrap_err();
        assert_eq!(
            failure.cause,
            ResponderError::OutOfRangeSelection { index: 7, len: 2 }
        );
        assert_eq!(failure.fallback, NO_NEWS_MESSAGE);
    }

    #[tokio::test]
    async fn index_equal_to_len_is_out_of_range() {
        let source = StubNews::new(Ok(NewsSearch::ok(articles(3))));
        let responder = NewsResponder::new(source, 20, IndexBoundMode::Actual)
            .with_index_picker(fixed(3));

        let failure = responder.respond("q", Selection::Random).await.unwrap_err();
        assert!(matches!(
            failure.cause,
            ResponderError::OutOfRangeSelection { index: 3, len: 3 }
        ));
    }

    #[tokio::test]
    async fn non_ok_status_falls_back_verbatim() {
        let search = NewsSearch {
            status: "error".into(),
            message: Some("rate limited".into()),
            ..NewsSearch::default()
        };
        let source = StubNews::new(Ok(search));
        let responder = NewsResponder::new(source, 20, IndexBoundMode::Actual);

        let failure = responder.respond("q", Selection::First).await.unwrap_err();
        assert!(matches!(failure.cause, ResponderError::UpstreamUnavailable { .. }));
        assert_eq!(failure.fallback, "目前沒有相關新聞。");
    }

    #[tokio::test]
    async fn ok_status_with_no_articles_is_empty_result() {
        let source = StubNews::new(Ok(NewsSearch::ok(vec![])));
        let responder = NewsResponder::new(source, 20, IndexBoundMode::Actual);

        let failure = responder.respond("q", Selection::Random).await.unwrap_err();
        assert!(matches!(failure.cause, ResponderError::EmptyResult { .. }));
        assert_eq!(failure.fallback, NO_NEWS_MESSAGE);
    }

    #[tokio::test]
    async fn transport_error_falls_back() {
        let source = StubNews::new(Err(ResponderError::unavailable("news", "timed out")));
        let responder = NewsResponder::new(source, 20, IndexBoundMode::Actual);

        let failure = responder.respond("q", Selection::First).await.unwrap_err();
        assert_eq!(failure.cause, ResponderError::unavailable("news", "timed out"));
        assert_eq!(failure.fallback, NO_NEWS_MESSAGE);
    }

    #[test]
    fn article_at_checks_bounds() {
        let list = articles(1);
        assert!(article_at(&list, 0).is_ok());
        assert!(matches!(
            article_at(&list, 1),
            Err(ResponderError::OutOfRangeSelection { index: 1, len: 1 })
        ));
    }

    #[test]
    fn format_renders_empty_description() {
        let article = NewsArticle::new("T", "", "https://x");
        assert_eq!(
            format_article(&article),
            "最新新聞：\n\n標題: T\n描述: \n\n更多詳情: https://x"
        );
    }
}
