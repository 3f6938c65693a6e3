//! Error types for the judging engine.
//!
//! Only [`EngineError`] ever reaches a caller of [`crate::Engine`]. Scorer and
//! parse failures are absorbed per judge by the panel and show up as degraded
//! provenance on the outcome instead.

use std::time::Duration;

/// Maximum length of a provider response body echoed into an error.
const MAX_ERROR_BODY_LEN: usize = 200;

/// Failure talking to a scoring backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScorerError {
    /// Provider has no API key configured.
    #[error("provider {provider} is not configured: missing API key")]
    Configuration { provider: String },

    /// Request could not be sent or the connection failed.
    #[error("network error talking to {provider}: {message}")]
    Network { provider: String, message: String },

    /// Call exceeded the per-judge time budget.
    #[error("{provider} did not answer within {after:?}")]
    Timeout { provider: String, after: Duration },

    /// Rate limit exceeded (429).
    #[error("rate limited by {provider}")]
    RateLimited { provider: String },

    /// Credentials rejected (401/403).
    #[error("unauthorized by {provider}")]
    Unauthorized { provider: String },

    /// Any other non-success status.
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    /// 2xx response that is not a chat completion body.
    #[error("invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },
}

impl ScorerError {
    pub(crate) fn status(provider: &str, status: u16, body: &str) -> Self {
        Self::Status {
            provider: provider.to_string(),
            status,
            body: truncate_body(body),
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::RateLimited { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Configuration { .. } | Self::Unauthorized { .. } | Self::InvalidResponse { .. } => {
                false
            }
        }
    }

    pub fn provider(&self) -> &str {
        match self {
            Self::Configuration { provider }
            | Self::Network { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::RateLimited { provider }
            | Self::Unauthorized { provider }
            | Self::Status { provider, .. }
            | Self::InvalidResponse { provider, .. } => provider,
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_LEN {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_ERROR_BODY_LEN).collect();
        format!("{}...", head)
    }
}

/// Backend answered, but no score object could be recovered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("no JSON object found in scorer output")]
    NoJsonObject,

    #[error("JSON object in scorer output has no \"scores\" object")]
    MissingScores,
}

/// Invalid or unreadable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("judge {judge} references unknown provider {provider}")]
    UnknownProvider { judge: String, provider: String },

    #[error("duplicate judge id: {0}")]
    DuplicateJudge(String),

    #[error("invalid grade ladder: {0}")]
    GradeLadder(String),
}

/// Fatal evaluation errors.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("no judges configured")]
    EmptyPanel,

    #[error("record store error: {message}")]
    Store { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        let p = "featherless".to_string();
        assert!(ScorerError::RateLimited { provider: p.clone() }.is_retryable());
        assert!(ScorerError::status("featherless", 503, "down").is_retryable());
        assert!(!ScorerError::status("featherless", 400, "bad").is_retryable());
        assert!(!ScorerError::Configuration { provider: p.clone() }.is_retryable());
        assert!(!ScorerError::Unauthorized { provider: p }.is_retryable());
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        match ScorerError::status("k2", 500, &body) {
            ScorerError::Status { body, .. } => assert_eq!(body.len(), MAX_ERROR_BODY_LEN + 3),
            other => panic!("unexpected {other:?}"),
        }
    }
}
