//! HTTP client for an OpenAI-compatible chat-completions API.

use std::time::Duration;

use reqwest::{header, Client, Url};

use crate::error::LlmError;
use crate::retry::retry_with_backoff;
use crate::types::{ChatRequest, ChatResponse, Message};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

/// Use [`OpenAiClient::new`] for production or [`OpenAiClient::with_base_url`]
/// to point at a proxy or a mock server.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("api_key", &"[redacted]")
            .field("endpoint", &self.endpoint.as_str())
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl OpenAiClient {
    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`LlmError::Http`] if the client cannot be constructed, or
    /// [`LlmError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("dailybrief/0.1 (research-briefing)")
            .build()?;

        let endpoint = Url::parse(&format!(
            "{}/chat/completions",
            base_url.trim_end_matches('/')
        ))
        .map_err(|e| LlmError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Sends a system and a user message and returns the first choice's
    /// trimmed content.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Api`] for a non-2xx status that persists after retries.
    /// - [`LlmError::Http`] on transport failure after retries.
    /// - [`LlmError::Deserialize`] if the body is not a completion.
    /// - [`LlmError::EmptyResponse`] if no choice carries content.
    pub async fn chat(&self, model: &str, system: &str, user: &str) -> Result<String, LlmError> {
        let request = ChatRequest::new(model)
            .message(Message::system(system))
            .message(Message::user(user));

        let start = std::time::Instant::now();
        let content = retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            self.send(&request)
        })
        .await?;

        tracing::debug!(
            model,
            duration_ms = start.elapsed().as_millis(),
            chars = content.chars().count(),
            "chat completion"
        );
        Ok(content)
    }

    async fn send(&self, request: &ChatRequest) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| LlmError::Deserialize {
                context: format!("chat completion ({})", request.model),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| LlmError::EmptyResponse {
                model: request.model.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url_once() {
        let client = OpenAiClient::with_base_url("k", 5, "https://proxy.example/v1/").unwrap();
        assert_eq!(client.endpoint(), "https://proxy.example/v1/chat/completions");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = OpenAiClient::with_base_url("k", 5, "not a url").unwrap_err();
        assert!(matches!(err, LlmError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = OpenAiClient::new("sk-secret", 5).unwrap();
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
