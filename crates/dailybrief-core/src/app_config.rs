use std::path::PathBuf;

use crate::ConfigError;

#[derive(Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub sources_path: PathBuf,
    /// Needed only by commands that call the model; see
    /// [`AppConfig::openai_api_key`].
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub summary_model: String,
    pub briefing_model: String,
    pub llm_timeout_secs: u64,
    pub notion_api_key: Option<String>,
    pub notion_database_id: Option<String>,
    pub notion_base_url: String,
    pub lookback_days: u32,
    pub scraper_request_timeout_secs: u64,
    pub scraper_user_agent: String,
    pub scraper_mobile_user_agent: String,
    pub scraper_max_retries: u32,
    pub scraper_retry_backoff_base_secs: u64,
    pub scraper_inter_request_delay_ms: u64,
    pub max_concurrent_reports: usize,
    pub pdf_cache_path: PathBuf,
    pub debug_html_dir: Option<PathBuf>,
    pub schedule: String,
}

impl AppConfig {
    /// The OpenAI key, for commands that summarize.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `OPENAI_API_KEY` is unset
    /// or blank.
    pub fn openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))
    }

    /// Notion credentials, present only when both the key and the database id
    /// are configured.
    #[must_use]
    pub fn notion_credentials(&self) -> Option<(&str, &str)> {
        match (&self.notion_api_key, &self.notion_database_id) {
            (Some(key), Some(db)) => Some((key.as_str(), db.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("log_level", &self.log_level)
            .field("sources_path", &self.sources_path)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("openai_base_url", &self.openai_base_url)
            .field("summary_model", &self.summary_model)
            .field("briefing_model", &self.briefing_model)
            .field("llm_timeout_secs", &self.llm_timeout_secs)
            .field(
                "notion_api_key",
                &self.notion_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("notion_database_id", &self.notion_database_id)
            .field("notion_base_url", &self.notion_base_url)
            .field("lookback_days", &self.lookback_days)
            .field(
                "scraper_request_timeout_secs",
                &self.scraper_request_timeout_secs,
            )
            .field("scraper_user_agent", &self.scraper_user_agent)
            .field("scraper_mobile_user_agent", &self.scraper_mobile_user_agent)
            .field("scraper_max_retries", &self.scraper_max_retries)
            .field(
                "scraper_retry_backoff_base_secs",
                &self.scraper_retry_backoff_base_secs,
            )
            .field(
                "scraper_inter_request_delay_ms",
                &self.scraper_inter_request_delay_ms,
            )
            .field("max_concurrent_reports", &self.max_concurrent_reports)
            .field("pdf_cache_path", &self.pdf_cache_path)
            .field("debug_html_dir", &self.debug_html_dir)
            .field("schedule", &self.schedule)
            .finish()
    }
}
