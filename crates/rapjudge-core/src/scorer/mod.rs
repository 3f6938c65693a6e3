//! Scorer clients: one network call to one backend for one judge.
//!
//! Retry and timeout policy live in the panel, not here.

mod fake;
mod http;

pub use fake::{FakeReply, FakeScorer};
pub use http::HttpScorer;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::ScorerError;
use crate::prompt::ChatMessage;

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f32 = 0.7;

#[async_trait]
pub trait Scorer: Send + Sync {
    /// Send one chat-completion request and return the first completion's
    /// text verbatim (possibly empty).
    async fn call(
        &self,
        provider_name: &str,
        provider: &ProviderConfig,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, ScorerError>;
}
