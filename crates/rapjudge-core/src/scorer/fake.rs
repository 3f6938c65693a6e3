use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::Scorer;
use crate::config::ProviderConfig;
use crate::error::ScorerError;
use crate::prompt::ChatMessage;

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Text(String),
    Fail(ScorerError),
    /// Sleep, then answer.
    Delayed(Duration, Box<FakeReply>),
}

impl FakeReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn unreachable(provider: &str) -> Self {
        Self::Fail(ScorerError::Network {
            provider: provider.to_string(),
            message: "connection refused".to_string(),
        })
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }
}

/// In-process scorer answering from a per-model script.
///
/// Each model's replies are consumed in order; the last one repeats. Models
/// without a script are unreachable.
#[derive(Debug, Default)]
pub struct FakeScorer {
    scripts: Mutex<HashMap<String, VecDeque<FakeReply>>>,
    calls: AtomicUsize,
}

impl FakeScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call fails as unreachable.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn with_reply(self, model: &str, reply: FakeReply) -> Self {
        self.with_replies(model, vec![reply])
    }

    pub fn with_replies(self, model: &str, replies: Vec<FakeReply>) -> Self {
        if let Ok(mut scripts) = self.scripts.lock() {
            scripts.insert(model.to_string(), replies.into());
        }
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_reply(&self, provider_name: &str, model: &str) -> FakeReply {
        let Ok(mut scripts) = self.scripts.lock() else {
            return FakeReply::unreachable(provider_name);
        };
        match scripts.get_mut(model) {
            Some(queue) if queue.len() > 1 => queue
                .pop_front()
                .unwrap_or_else(|| FakeReply::unreachable(provider_name)),
            Some(queue) => queue
                .front()
                .cloned()
                .unwrap_or_else(|| FakeReply::unreachable(provider_name)),
            None => FakeReply::unreachable(provider_name),
        }
    }
}

#[async_trait]
impl Scorer for FakeScorer {
    async fn call(
        &self,
        provider_name: &str,
        _provider: &ProviderConfig,
        model: &str,
        _messages: &[ChatMessage],
        _max_tokens: u32,
    ) -> Result<String, ScorerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut reply = self.next_reply(provider_name, model);
        loop {
            match reply {
                FakeReply::Text(text) => return Ok(text),
                FakeReply::Fail(err) => return Err(err),
                FakeReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> ProviderConfig {
        ProviderConfig::new("http://fake")
    }

    #[tokio::test]
    async fn replies_in_order_then_repeat_last() {
        let scorer = FakeScorer::new().with_replies(
            "m",
            vec![FakeReply::unreachable("p"), FakeReply::text("ok")],
        );
        assert!(scorer.call("p", &provider(), "m", &[], 10).await.is_err());
        assert_eq!(scorer.call("p", &provider(), "m", &[], 10).await.unwrap(), "ok");
        assert_eq!(scorer.call("p", &provider(), "m", &[], 10).await.unwrap(), "ok");
        assert_eq!(scorer.calls(), 3);
    }

    #[tokio::test]
    async fn unscripted_models_are_unreachable() {
        let err = FakeScorer::offline()
            .call("p", &provider(), "other", &[], 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ScorerError::Network { .. }));
    }
}
