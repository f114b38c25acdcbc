//! HTML snapshots of report pages for tuning extraction heuristics.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

static UNSAFE_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("valid regex"));

const MAX_COMPANY_CHARS: usize = 20;

#[derive(Debug, Clone)]
pub struct DebugSnapshots {
    dir: PathBuf,
}

impl DebugSnapshots {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `html` as `{prefix}_{company}_{unix-ts}.html`. Failures are
    /// logged, never returned.
    pub async fn save(&self, prefix: &str, company: &str, html: &str) {
        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            tracing::warn!(dir = %self.dir.display(), error = %e, "cannot create debug snapshot dir");
            return;
        }
        let path = self.dir.join(snapshot_file_name(
            prefix,
            company,
            chrono::Utc::now().timestamp(),
        ));
        match tokio::fs::write(&path, html).await {
            Ok(()) => tracing::debug!(path = %path.display(), bytes = html.len(), "saved page snapshot"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to save page snapshot"),
        }
    }
}

fn snapshot_file_name(prefix: &str, company: &str, timestamp: i64) -> String {
    let safe: String = UNSAFE_CHARS_RE
        .replace_all(company, "")
        .chars()
        .take(MAX_COMPANY_CHARS)
        .collect();
    format!("{prefix}_{safe}_{timestamp}.html")
}
