//! On-disk cache of extracted PDF text, keyed by the SHA-256 of the URL.
//!
//! Reports are often listed on consecutive days; the cache spares a second
//! download and parse. It is loaded once per run, shared by the extraction
//! workers, and written back at the end.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::ScraperError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedPdf {
    pub url: String,
    pub text: String,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct PdfCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, CachedPdf>>,
}

impl PdfCache {
    /// Load the cache at `path`. A missing file yields an empty cache; an
    /// unreadable or corrupt file is logged and also yields an empty cache.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<HashMap<String, CachedPdf>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "PDF cache is corrupt; starting empty");
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read PDF cache; starting empty");
                HashMap::new()
            }
        };
        tracing::info!(path = %path.display(), entries = entries.len(), "PDF cache loaded");
        Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        }
    }

    #[must_use]
    pub fn get(&self, url: &str) -> Option<String> {
        self.lock().get(&cache_key(url)).map(|e| e.text.clone())
    }

    pub fn insert(&self, url: &str, text: &str) {
        self.lock().insert(
            cache_key(url),
            CachedPdf {
                url: url.to_owned(),
                text: text.to_owned(),
                cached_at: Utc::now(),
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write the cache back to its file as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Json`] if serialization fails or
    /// [`ScraperError::Io`] if the file cannot be written.
    pub fn save(&self) -> Result<(), ScraperError> {
        let json = {
            let entries = self.lock();
            serde_json::to_string_pretty(&*entries).map_err(|e| ScraperError::Json {
                context: "PDF cache".to_owned(),
                source: e,
            })?
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ScraperError::Io {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(&self.path, json).map_err(|e| ScraperError::Io {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CachedPdf>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn cache_key(url: &str) -> String {
    format!("{:x}", Sha256::digest(url.as_bytes()))
}
