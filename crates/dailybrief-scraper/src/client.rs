//! HTTP access to the research portals.
//!
//! [`HttpFetcher`] returns every non-429 response, including 4xx/5xx, so the
//! extraction pipeline can walk its fallback URLs. Rate limiting and transport
//! failures are retried with backoff.

use std::time::Duration;

use reqwest::{header, Client, StatusCode};

use dailybrief_core::AppConfig;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// Which `User-Agent` to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Agent {
    Desktop,
    /// Shinhan's framed viewer only serves the report body to mobile browsers.
    Mobile,
}

/// A decoded HTML (or text) response.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL that was requested.
    pub url: String,
    /// URL after HTTP redirects.
    pub final_url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedPage {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A raw binary response, used for PDF downloads.
#[derive(Debug, Clone)]
pub struct FetchedBytes {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl FetchedBytes {
    /// Lowercased `Content-Type`, or an empty string when absent.
    #[must_use]
    pub fn content_type_lower(&self) -> String {
        self.content_type
            .as_deref()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }
}

pub struct HttpFetcher {
    client: Client,
    mobile_user_agent: String,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl HttpFetcher {
    /// Creates a fetcher with the given timeout, desktop and mobile
    /// `User-Agent`s, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        mobile_user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            mobile_user_agent: mobile_user_agent.to_owned(),
            max_retries,
            backoff_base_secs,
        })
    }

    /// Builds a fetcher from the scraper settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self, ScraperError> {
        Self::new(
            config.scraper_request_timeout_secs,
            &config.scraper_user_agent,
            &config.scraper_mobile_user_agent,
            config.scraper_max_retries,
            config.scraper_retry_backoff_base_secs,
        )
    }

    /// GETs `url` and decodes the body as text, honouring the charset in the
    /// `Content-Type` header (the portals serve EUC-KR).
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] when 429 persists after all retries.
    /// - [`ScraperError::Http`] on transport failure after all retries.
    pub async fn fetch_page(&self, url: &str, agent: Agent) -> Result<FetchedPage, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self.get(url, agent).send().await?;
            let response = check_rate_limit(url, response)?;
            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let content_type = content_type_of(&response);
            let body = response.text().await?;
            Ok(FetchedPage {
                url: url.to_owned(),
                final_url,
                status,
                content_type,
                body,
            })
        })
        .await
    }

    /// GETs `url` and returns the raw bytes.
    ///
    /// # Errors
    ///
    /// Same conditions as [`HttpFetcher::fetch_page`].
    pub async fn fetch_bytes(&self, url: &str) -> Result<FetchedBytes, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self.get(url, Agent::Desktop).send().await?;
            let response = check_rate_limit(url, response)?;
            let status = response.status().as_u16();
            let content_type = content_type_of(&response);
            let bytes = response.bytes().await?.to_vec();
            Ok(FetchedBytes {
                url: url.to_owned(),
                status,
                content_type,
                bytes,
            })
        })
        .await
    }

    fn get(&self, url: &str, agent: Agent) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(
                header::ACCEPT,
                "text/html,application/xhtml+xml,application/pdf;q=0.9,*/*;q=0.8",
            )
            .header(header::ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9,en-US;q=0.8");
        match agent {
            Agent::Desktop => request,
            Agent::Mobile => request.header(header::USER_AGENT, &self.mobile_user_agent),
        }
    }
}

fn check_rate_limit(
    url: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ScraperError> {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return Ok(response);
    }
    let retry_after_secs = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(60);
    Err(ScraperError::RateLimited {
        url: url.to_owned(),
        retry_after_secs,
    })
}

fn content_type_of(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
