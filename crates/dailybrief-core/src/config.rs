use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

pub const DEFAULT_MOBILE_USER_AGENT: &str = "Mozilla/5.0 (Linux; Android 10; SM-G973F) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Mobile Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let optional =
        |var: &str| -> Option<String> { lookup(var).ok().filter(|v| !v.trim().is_empty()) };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let openai_api_key = optional("OPENAI_API_KEY");

    let notion_api_key = optional("NOTION_API_KEY");
    let notion_database_id = optional("NOTION_DATABASE_ID");
    if notion_api_key.is_some() && notion_database_id.is_none() {
        return Err(ConfigError::MissingEnvVar("NOTION_DATABASE_ID".to_string()));
    }

    let log_level = or_default("DAILYBRIEF_LOG_LEVEL", "info");
    let sources_path = PathBuf::from(or_default(
        "DAILYBRIEF_SOURCES_PATH",
        "./config/sources.yaml",
    ));

    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
    let summary_model = or_default("OPENAI_SUMMARY_MODEL", "gpt-4o-mini");
    let briefing_model = or_default("OPENAI_MODEL_NAME", "gpt-5-mini");
    let llm_timeout_secs = parse_u64("DAILYBRIEF_LLM_TIMEOUT_SECS", "120")?;
    let notion_base_url = or_default("NOTION_BASE_URL", "https://api.notion.com/v1");

    let lookback_days = parse_u32("DAILYBRIEF_LOOKBACK_DAYS", "1")?;
    if lookback_days == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DAILYBRIEF_LOOKBACK_DAYS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let scraper_request_timeout_secs =
        parse_u64("DAILYBRIEF_SCRAPER_REQUEST_TIMEOUT_SECS", "15")?;
    let scraper_user_agent =
        or_default("DAILYBRIEF_SCRAPER_USER_AGENT", DEFAULT_DESKTOP_USER_AGENT);
    let scraper_mobile_user_agent = or_default(
        "DAILYBRIEF_SCRAPER_MOBILE_USER_AGENT",
        DEFAULT_MOBILE_USER_AGENT,
    );
    let scraper_max_retries = parse_u32("DAILYBRIEF_SCRAPER_MAX_RETRIES", "2")?;
    let scraper_retry_backoff_base_secs =
        parse_u64("DAILYBRIEF_SCRAPER_RETRY_BACKOFF_BASE_SECS", "1")?;
    let scraper_inter_request_delay_ms =
        parse_u64("DAILYBRIEF_SCRAPER_INTER_REQUEST_DELAY_MS", "500")?;
    let max_concurrent_reports = parse_usize("DAILYBRIEF_MAX_CONCURRENT_REPORTS", "4")?;

    let pdf_cache_path = PathBuf::from(or_default(
        "DAILYBRIEF_PDF_CACHE_PATH",
        "./pdf_cache.json",
    ));
    let debug_html_dir = optional("DAILYBRIEF_DEBUG_HTML_DIR").map(PathBuf::from);
    let schedule = or_default("DAILYBRIEF_SCHEDULE", "0 0 23 * * Sun-Thu");

    Ok(AppConfig {
        log_level,
        sources_path,
        openai_api_key,
        openai_base_url,
        summary_model,
        briefing_model,
        llm_timeout_secs,
        notion_api_key,
        notion_database_id,
        notion_base_url,
        lookback_days,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_mobile_user_agent,
        scraper_max_retries,
        scraper_retry_backoff_base_secs,
        scraper_inter_request_delay_ms,
        max_concurrent_reports,
        pdf_cache_path,
        debug_html_dir,
        schedule,
    })
}
