use thiserror::Error;

/// Errors returned by the chat-completions client.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The completion had no choices or only whitespace content.
    #[error("empty response from model {model}")]
    EmptyResponse { model: String },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
