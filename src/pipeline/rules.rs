//! Keyword rules that map message text to an [`Intent`].
//!
//! Rules are checked in order and the first keyword contained in the text
//! wins. Matching is plain substring containment with no case folding or
//! whitespace normalization. Text that matches nothing is a
//! [`Intent::GeneralQuery`], so classification never fails.

use tracing::debug;

use crate::pipeline::types::Intent;

pub const NEWS_KEYWORD: &str = "新聞";
pub const MORE_NEWS_KEYWORD: &str = "更多";
pub const STORY_KEYWORD: &str = "故事";

/// A single keyword → intent rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    pub keyword: String,
    pub intent: Intent,
}

/// Ordered keyword classifier.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<KeywordRule>,
}

impl IntentClassifier {
    /// Create a classifier with the built-in keyword order:
    /// news, more news, story.
    pub fn default_rules() -> Self {
        let rules = vec![
            KeywordRule {
                keyword: NEWS_KEYWORD.into(),
                intent: Intent::NewsQuery,
            },
            KeywordRule {
                keyword: MORE_NEWS_KEYWORD.into(),
                intent: Intent::MoreNewsQuery,
            },
            KeywordRule {
                keyword: STORY_KEYWORD.into(),
                intent: Intent::StoryQuery,
            },
        ];
        Self { rules }
    }

    /// Create a classifier with no rules (everything is a general query).
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule after the existing ones.
    pub fn add_rule(&mut self, keyword: &str, intent: Intent) {
        self.rules.push(KeywordRule {
            keyword: keyword.into(),
            intent,
        });
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Classify a message.
    pub fn classify(&self, text: &str) -> Intent {
        for rule in &self.rules {
            if !rule.keyword.is_empty() && text.contains(rule.keyword.as_str()) {
                debug!(keyword = %rule.keyword, intent = rule.intent.label(), "Keyword matched");
                return rule.intent;
            }
        }
        Intent::GeneralQuery
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::default_rules()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn news_keyword_is_news_query() {
        let classifier = IntentClassifier::default_rules();
        assert_eq!(classifier.classify("今天有什麼新聞？"), Intent::NewsQuery);
        assert_eq!(classifier.classify("新聞"), Intent::NewsQuery);
    }

    #[test]
    fn more_keyword_is_more_news_query() {
        let classifier = IntentClassifier::default_rules();
        assert_eq!(classifier.classify("再給我更多"), Intent::MoreNewsQuery);
    }

    #[test]
    fn story_keyword_is_story_query() {
        let classifier = IntentClassifier::default_rules();
        assert_eq!(classifier.classify("說個故事吧"), Intent::StoryQuery);
    }

    #[test]
    fn unmatched_text_is_general_query() {
        let classifier = IntentClassifier::default_rules();
        for text in ["hello", "news", "你好", " ", "Story time"] {
            assert_eq!(classifier.classify(text), Intent::GeneralQuery, "{text}");
        }
    }

    #[test]
    fn earlier_rule_wins_over_later_rule() {
        let classifier = IntentClassifier::default_rules();
        // Contains both the news and the more-news keyword.
        assert_eq!(classifier.classify("更多新聞"), Intent::NewsQuery);
        // Contains both the more-news and the story keyword.
        assert_eq!(classifier.classify("更多故事"), Intent::MoreNewsQuery);
        assert_eq!(classifier.classify("新聞故事"), Intent::NewsQuery);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let mut classifier = IntentClassifier::empty();
        classifier.add_rule("news", Intent::NewsQuery);
        assert_eq!(classifier.classify("latest news"), Intent::NewsQuery);
        assert_eq!(classifier.classify("latest NEWS"), Intent::GeneralQuery);
    }

    #[test]
    fn empty_classifier_is_total() {
        let classifier = IntentClassifier::empty();
        assert_eq!(classifier.classify("新聞"), Intent::GeneralQuery);
    }

    #[test]
    fn added_rules_come_after_defaults() {
        let mut classifier = IntentClassifier::default_rules();
        classifier.add_rule("story", Intent::StoryQuery);
        assert_eq!(classifier.rules().len(), 4);
        assert_eq!(classifier.classify("a story about 新聞"), Intent::NewsQuery);
        assert_eq!(classifier.classify("a story"), Intent::StoryQuery);
    }
}
