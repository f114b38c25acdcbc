use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {url} (retry after {retry_after_secs}s)")]
    RateLimited { url: String, retry_after_secs: u64 },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("listing page {url} has no table")]
    MissingTable { url: String },

    #[error("PDF parse error for {url}: {reason}")]
    Pdf { url: String, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error for {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
