//! Error types for the LINE storyteller.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Inbound webhook errors. Every variant maps to HTTP 400.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Missing X-Line-Signature header")]
    MissingSignature,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(String),
}

/// Why a responder could not produce its normal reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponderError {
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    #[error("{service} returned no usable data")]
    EmptyResult { service: String },

    #[error("Selected index {index} is out of range for {len} results")]
    OutOfRangeSelection { index: usize, len: usize },

    #[error("{service} is not configured")]
    NotConfigured { service: String },
}

impl ResponderError {
    pub fn unavailable(service: &str, reason: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            service: service.to_string(),
            reason: reason.into(),
        }
    }

    pub fn empty(service: &str) -> Self {
        Self::EmptyResult {
            service: service.to_string(),
        }
    }

    pub fn not_configured(service: &str) -> Self {
        Self::NotConfigured {
            service: service.to_string(),
        }
    }
}

/// A responder failure together with the text the user should see instead.
///
/// Responders return this as their error value so callers can inspect the
/// typed cause; the fallback text is only substituted by the event processor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{cause}")]
pub struct ResponderFailure {
    pub cause: ResponderError,
    pub fallback: String,
}

impl ResponderFailure {
    pub fn new(cause: ResponderError, fallback: impl Into<String>) -> Self {
        Self {
            cause,
            fallback: fallback.into(),
        }
    }
}

/// Outbound reply errors.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Reply rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Reply transport failed: {0}")]
    Transport(String),
}
