use thiserror::Error;

/// Errors returned by the Notion API client.
#[derive(Debug, Error)]
pub enum NotionError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Notion answered with a non-2xx status.
    #[error("Notion API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
