//! Story responder: generated replies, optionally seeded by a headline.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::ResponderFailure;
use crate::llm::TextGenerator;
use crate::news::responder::format_article;
use crate::news::{NewsArticle, NewsResponder, Selection};

/// Reply used when the generative-text service produced nothing.
pub const STORY_FALLBACK_MESSAGE: &str = "抱歉，目前無法生成故事。";

/// How the prompt is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryMode<'a> {
    /// Send the user's own text as the prompt.
    Direct(&'a str),
    /// Build a children's branching-story prompt from a random headline.
    NewsSeeded,
}

/// Build the instructional prompt for a news-seeded story.
pub fn story_prompt(article: &NewsArticle) -> String {
    format!(
        "請根據以下新聞，為 8 到 12 歲的孩子創作一個關於性別平等與情感教育的互動式故事。\n\
         \n\
         新聞標題：{title}\n\
         新聞摘要：{description}\n\
         \n\
         要求：\n\
         1. 用溫暖、容易理解的語言，篇幅約 300 字。\n\
         2. 故事中至少安排兩個抉擇點，每個抉擇點提供 A、B 兩個選項，讓孩子決定主角接下來怎麼做。\n\
         3. 簡短說明每個選項可能帶來的結果，不要直接給出標準答案。\n\
         4. 結尾提出一個問題，邀請孩子分享自己的感受。",
        title = article.title,
        description = article.description,
    )
}

pub struct StoryResponder {
    generator: Arc<dyn TextGenerator>,
    news: Arc<NewsResponder>,
    seed_query: String,
}

impl StoryResponder {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        news: Arc<NewsResponder>,
        seed_query: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            news,
            seed_query: seed_query.into(),
        }
    }

    /// Produce a generated reply.
    ///
    /// On failure the fallback is the fixed apology, followed by the seeding
    /// headline when one was already chosen.
    pub async fn respond(
        &self,
        mode: StoryMode<'_>,
        user_id: Option<&str>,
    ) -> Result<String, ResponderFailure> {
        match mode {
            StoryMode::Direct(prompt) => {
                info!(user_id, backend = self.generator.name(), "Generating direct reply");
                self.generator
                    .generate(prompt)
                    .await
                    .map_err(|cause| ResponderFailure::new(cause, STORY_FALLBACK_MESSAGE))
            }
            StoryMode::NewsSeeded => {
                let article = self
                    .news
                    .pick_article(&self.seed_query, Selection::Random)
                    .await
                    .map_err(|cause| {
                        warn!(error = %cause, "Could not seed story from news");
                        ResponderFailure::new(cause, STORY_FALLBACK_MESSAGE)
                    })?;

                info!(
                    user_id,
                    title = %article.title,
                    backend = self.generator.name(),
                    "Generating news-seeded story"
                );

                self.generator
                    .generate(&story_prompt(&article))
                    .await
                    .map_err(|cause| {
                        ResponderFailure::new(
                            cause,
                            format!("{STORY_FALLBACK_MESSAGE}\n\n{}", format_article(&article)),
                        )
                    })
            }
        }
    }
}
