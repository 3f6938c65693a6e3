use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Scorer, TEMPERATURE};
use crate::config::ProviderConfig;
use crate::error::ScorerError;
use crate::prompt::ChatMessage;

const USER_AGENT_VALUE: &str = concat!("rapjudge/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completion client over HTTP with bearer auth.
#[derive(Debug, Clone)]
pub struct HttpScorer {
    client: reqwest::Client,
}

impl HttpScorer {
    pub fn new() -> Result<Self, ScorerError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()
            .map_err(|e| ScorerError::Network {
                provider: "http".to_string(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Scorer for HttpScorer {
    async fn call(
        &self,
        provider_name: &str,
        provider: &ProviderConfig,
        model: &str,
        messages: &[ChatMessage],
        max_tokens: u32,
    ) -> Result<String, ScorerError> {
        let api_key = provider
            .api_key
            .as_deref()
            .ok_or_else(|| ScorerError::Configuration {
                provider: provider_name.to_string(),
            })?;

        let body = ChatRequest {
            model,
            messages,
            max_tokens,
            temperature: TEMPERATURE,
            stream: false,
        };

        debug!(provider = provider_name, model, url = %provider.url, "sending chat completion");
        let response = self
            .client
            .post(&provider.url)
            .header(AUTHORIZATION, format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| ScorerError::Network {
                provider: provider_name.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ScorerError::Unauthorized {
                    provider: provider_name.to_string(),
                },
                StatusCode::TOO_MANY_REQUESTS => ScorerError::RateLimited {
                    provider: provider_name.to_string(),
                },
                _ => ScorerError::status(provider_name, status.as_u16(), &text),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| ScorerError::InvalidResponse {
                    provider: provider_name.to_string(),
                    message: e.to_string(),
                })?;

        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}
