//! Configuration types.
//!
//! Everything is read from the environment once in `main` and then shared
//! read-only as `Arc<AppConfig>`.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_NEWS_QUERY: &str = "gender equality OR emotional education";
pub const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org";
/// Largest page the news service accepts.
pub const MAX_NEWS_PAGE_SIZE: usize = 100;
pub const DEFAULT_GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_LINE_API_BASE_URL: &str = "https://api.line.me";

/// Deployment mode, from `API_ENV`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Develop,
    Production,
    Other(String),
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "develop" | "development" => Self::Develop,
            "production" => Self::Production,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// How the random article index is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexBoundMode {
    /// Draw from the number of articles actually returned.
    Actual,
    /// Draw from the page size that was requested.
    Expected,
}

/// What to do with messages that match no keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneralReplyMode {
    /// Reply with the fixed help text.
    Canned,
    /// Forward the message to the generative-text service as-is.
    Chat,
}

/// Messaging platform credentials.
#[derive(Debug, Clone)]
pub struct LineConfig {
    pub channel_secret: SecretString,
    pub channel_access_token: SecretString,
    pub api_base_url: String,
}

/// News search settings.
#[derive(Debug, Clone)]
pub struct NewsConfig {
    pub api_key: Option<SecretString>,
    pub api_base_url: String,
    pub query: String,
    /// Number of articles requested per search.
    pub page_size: usize,
    pub index_bound: IndexBoundMode,
}

/// Generative-text settings.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<SecretString>,
    pub api_base_url: String,
    pub model: String,
}

/// Process-wide service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub line: LineConfig,
    pub news: NewsConfig,
    pub gemini: GeminiConfig,
    /// External state store URL. Reported at startup, never written to.
    pub firebase_url: Option<String>,
    /// Raw `LOG` value.
    pub log_level: String,
    pub port: u16,
    pub environment: Environment,
    /// Timeout applied to every outbound HTTP call.
    pub http_timeout: Duration,
    pub general_reply_mode: GeneralReplyMode,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let channel_secret = get("LINE_CHANNEL_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("LINE_CHANNEL_SECRET".into()))?;
        let channel_access_token = get("LINE_CHANNEL_ACCESS_TOKEN")
            .ok_or_else(|| ConfigError::MissingEnvVar("LINE_CHANNEL_ACCESS_TOKEN".into()))?;

        let port = parse_or("PORT", get("PORT"), 8080u16)?;
        let timeout_secs = parse_or("HTTP_TIMEOUT_SECS", get("HTTP_TIMEOUT_SECS"), 10u64)?;
        let page_size = parse_or("NEWS_PAGE_SIZE", get("NEWS_PAGE_SIZE"), 20usize)?;
        if !(1..=MAX_NEWS_PAGE_SIZE).contains(&page_size) {
            return Err(ConfigError::InvalidValue {
                key: "NEWS_PAGE_SIZE".into(),
                message: format!("must be between 1 and {MAX_NEWS_PAGE_SIZE}, got {page_size}"),
            });
        }

        let index_bound = match get("NEWS_INDEX_BOUND").as_deref().map(str::trim) {
            None | Some("actual") => IndexBoundMode::Actual,
            Some("expected") => IndexBoundMode::Expected,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "NEWS_INDEX_BOUND".into(),
                    message: format!("expected 'actual' or 'expected', got '{other}'"),
                });
            }
        };

        let general_reply_mode = match get("GENERAL_REPLY_MODE").as_deref().map(str::trim) {
            None | Some("canned") => GeneralReplyMode::Canned,
            Some("chat") => GeneralReplyMode::Chat,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "GENERAL_REPLY_MODE".into(),
                    message: format!("expected 'canned' or 'chat', got '{other}'"),
                });
            }
        };

        Ok(Self {
            line: LineConfig {
                channel_secret: SecretString::from(channel_secret),
                channel_access_token: SecretString::from(channel_access_token),
                api_base_url: get("LINE_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_LINE_API_BASE_URL.to_string()),
            },
            news: NewsConfig {
                api_key: get("NEWS_API_KEY").map(SecretString::from),
                api_base_url: get("NEWS_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_NEWS_API_BASE_URL.to_string()),
                query: get("NEWS_QUERY").unwrap_or_else(|| DEFAULT_NEWS_QUERY.to_string()),
                page_size,
                index_bound,
            },
            gemini: GeminiConfig {
                api_key: get("GEMINI_API_KEY").map(SecretString::from),
                api_base_url: get("GEMINI_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE_URL.to_string()),
                model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            },
            firebase_url: get("FIREBASE_URL"),
            log_level: get("LOG").unwrap_or_else(|| "WARNING".to_string()),
            port,
            environment: Environment::parse(
                get("API_ENV").as_deref().unwrap_or("develop"),
            ),
            http_timeout: Duration::from_secs(timeout_secs),
            general_reply_mode,
        })
    }

    /// Build the shared outbound HTTP client with the configured timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, ConfigError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))
    }

    /// Translate `LOG` into a tracing filter directive.
    pub fn log_directive(&self) -> String {
        log_directive(&self.log_level)
    }
}

/// Map Python-style level names onto tracing levels.
pub fn log_directive(level: &str) -> String {
    match level.trim().to_ascii_lowercase().as_str() {
        "critical" | "fatal" | "error" => "error".into(),
        "warning" | "warn" => "warn".into(),
        "info" => "info".into(),
        "debug" => "debug".into(),
        "trace" | "notset" => "trace".into(),
        // Already a filter expression such as "line_storyteller=debug".
        other => other.to_string(),
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{raw}': {e}"),
            }),
    }
}
