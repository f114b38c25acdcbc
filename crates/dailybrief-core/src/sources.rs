use std::collections::HashSet;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::report::SourceKind;
use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingConfig {
    pub category: String,
    /// Path relative to the source's `base_url`.
    pub path: String,
    /// Keep `/item/` and `/frgn/` title links (per-stock listings link there).
    #[serde(default)]
    pub allow_item_links: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub kind: SourceKind,
    pub base_url: String,
    /// Regexes a PDF link must match before it is downloaded.
    #[serde(default)]
    pub pdf_url_patterns: Vec<String>,
    pub listings: Vec<ListingConfig>,
}

impl SourceConfig {
    /// Absolute URL of a listing page.
    #[must_use]
    pub fn listing_url(&self, listing: &ListingConfig) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            listing.path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SourcesFile {
    pub sources: Vec<SourceConfig>,
}

impl SourcesFile {
    /// PDF whitelist patterns across every source.
    #[must_use]
    pub fn pdf_url_patterns(&self) -> Vec<String> {
        self.sources
            .iter()
            .flat_map(|s| s.pdf_url_patterns.iter().cloned())
            .collect()
    }
}

/// Load and validate the source definitions from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources_file: SourcesFile =
        serde_yaml::from_str(&content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources_file)?;

    Ok(sources_file)
}

fn validate_sources(sources_file: &SourcesFile) -> Result<(), ConfigError> {
    if sources_file.sources.is_empty() {
        return Err(ConfigError::Validation(
            "at least one source must be configured".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for source in &sources_file.sources {
        if source.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "source name must be non-empty".to_string(),
            ));
        }

        if !seen_names.insert(source.name.trim().to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate source name: '{}'",
                source.name
            )));
        }

        if !(source.base_url.starts_with("http://") || source.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(format!(
                "source '{}' has invalid base_url '{}'; must be an absolute http(s) URL",
                source.name, source.base_url
            )));
        }

        if source.listings.is_empty() {
            return Err(ConfigError::Validation(format!(
                "source '{}' must define at least one listing",
                source.name
            )));
        }

        for listing in &source.listings {
            if listing.category.trim().is_empty() || listing.path.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has a listing with an empty category or path",
                    source.name
                )));
            }
        }

        for pattern in &source.pdf_url_patterns {
            if let Err(e) = Regex::new(pattern) {
                return Err(ConfigError::Validation(format!(
                    "source '{}' has invalid pdf_url_pattern '{pattern}': {e}",
                    source.name
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
