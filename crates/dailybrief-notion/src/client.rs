//! HTTP client for the Notion REST API.
//!
//! Notion caps a request at 100 child blocks, so long briefings are created
//! with the first batch and the remainder is appended batch by batch.

use std::time::Duration;

use reqwest::{header, Client, Method, Url};
use serde::{Deserialize, Serialize};

use crate::error::NotionError;
use crate::page::{Block, BriefingProperties, NewPage, Parent};

const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Most children Notion accepts in one request.
pub const MAX_BLOCKS_PER_REQUEST: usize = 100;

/// The page Notion created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PublishedPage {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Serialize)]
struct AppendChildren<'a> {
    children: &'a [Block],
}

#[derive(Serialize)]
struct CreatePage<'a> {
    parent: &'a Parent,
    properties: &'a BriefingProperties,
    children: &'a [Block],
}

pub struct NotionClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl NotionClient {
    /// # Errors
    ///
    /// Returns [`NotionError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, NotionError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotionError::Http`] if the client cannot be constructed, or
    /// [`NotionError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("dailybrief/0.1 (research-briefing)")
            .build()?;

        // A trailing slash keeps `Url::join` appending rather than replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| NotionError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Create the database entry and append every block beyond the first
    /// hundred in follow-up batches.
    ///
    /// # Errors
    ///
    /// - [`NotionError::Api`] if Notion rejects any request.
    /// - [`NotionError::Http`] on transport failure.
    /// - [`NotionError::Deserialize`] if the create response has no page id.
    pub async fn publish(&self, page: &NewPage) -> Result<PublishedPage, NotionError> {
        let split = page.children.len().min(MAX_BLOCKS_PER_REQUEST);
        let (first, rest) = page.children.split_at(split);

        let created: PublishedPage = {
            let body = self
                .send(
                    Method::POST,
                    "pages",
                    &CreatePage {
                        parent: &page.parent,
                        properties: &page.properties,
                        children: first,
                    },
                )
                .await?;
            serde_json::from_str(&body).map_err(|e| NotionError::Deserialize {
                context: "create page".to_string(),
                source: e,
            })?
        };
        tracing::info!(page_id = %created.id, blocks = first.len(), "Notion page created");

        for (idx, batch) in rest.chunks(MAX_BLOCKS_PER_REQUEST).enumerate() {
            self.send(
                Method::PATCH,
                &format!("blocks/{}/children", created.id),
                &AppendChildren { children: batch },
            )
            .await?;
            tracing::debug!(
                page_id = %created.id,
                batch = idx + 1,
                blocks = batch.len(),
                "appended blocks"
            );
        }

        Ok(created)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<String, NotionError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| NotionError::InvalidBaseUrl {
                url: format!("{}{path}", self.base_url),
                reason: e.to_string(),
            })?;

        let response = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(NotionError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_keeps_version_segment() {
        let client = NotionClient::with_base_url("k", 5, "https://api.notion.com/v1").unwrap();
        assert_eq!(
            client.base_url.join("pages").unwrap().as_str(),
            "https://api.notion.com/v1/pages"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = NotionClient::with_base_url("k", 5, "::").unwrap_err();
        assert!(matches!(err, NotionError::InvalidBaseUrl { .. }));
    }
}
