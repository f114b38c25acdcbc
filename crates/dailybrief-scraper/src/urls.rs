//! URL normalization and repair for report links.
//!
//! Listing pages frequently carry truncated attachment links (`....p`,
//! `....pd`) or links without an extension; [`pdf_url_candidates`] produces
//! the ordered list of URLs worth trying.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;

static TRAILING_DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\d+$").expect("valid regex"));

static BLOCKED_PDF_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)/(item|chart|quote|news|frgn)/",
        r"(?i)finance\.naver\.com/item/",
        r"(?i)\.frgn\.naver",
        r"(?i)/item/frgn",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

const ALWAYS_BLOCKED_LISTING_PATHS: [&str; 3] = ["/chart/", "/quote/", "/news/"];
const ITEM_LISTING_PATHS: [&str; 2] = ["/item/", "/frgn/"];

/// Drop everything from the first `?` or `#`.
#[must_use]
pub fn strip_query_and_fragment(url: &str) -> &str {
    url.find(['?', '#']).map_or(url, |idx| &url[..idx])
}

/// Resolve `href` against `base`. Absolute hrefs are returned unchanged.
#[must_use]
pub fn resolve(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if is_absolute_http(href) {
        return Some(href.to_owned());
    }
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

#[must_use]
pub fn is_absolute_http(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Ordered, de-duplicated download attempts for a raw attachment link.
///
/// The first entry is the repaired URL when repair changed anything, then the
/// stripped original, then the truncated-extension fix, then the original with
/// `.pdf` appended when it has no (partial) PDF extension.
#[must_use]
pub fn pdf_url_candidates(raw: &str) -> Vec<String> {
    let stripped = strip_query_and_fragment(raw).trim();
    if stripped.is_empty() {
        return Vec::new();
    }
    let lower = stripped.to_ascii_lowercase();
    let repaired = repair_pdf_url(stripped);

    let mut attempts = Vec::new();
    if repaired != stripped {
        attempts.push(repaired);
    }
    attempts.push(stripped.to_owned());
    if let Some(fixed) = fix_truncated_extension(stripped) {
        attempts.push(fixed);
    }
    if !lower.ends_with(".pdf") && !lower.ends_with(".p") && !lower.ends_with(".pd") {
        attempts.push(format!("{stripped}.pdf"));
    }

    let mut unique = Vec::with_capacity(attempts.len());
    for attempt in attempts {
        if !unique.contains(&attempt) {
            unique.push(attempt);
        }
    }
    unique
}

/// Best single guess at the real PDF URL.
fn repair_pdf_url(stripped: &str) -> String {
    if stripped.to_ascii_lowercase().ends_with(".pdf") {
        return stripped.to_owned();
    }
    if let Some(fixed) = fix_truncated_extension(stripped) {
        return fixed;
    }
    if stripped.contains("pstatic.net") && !stripped.ends_with('.') {
        return format!("{stripped}.pdf");
    }
    if TRAILING_DIGITS_RE.is_match(stripped) {
        return format!("{stripped}.pdf");
    }
    stripped.to_owned()
}

/// `.p` / `.pd` → `.pdf`.
fn fix_truncated_extension(url: &str) -> Option<String> {
    if let Some(prefix) = url.strip_suffix(".p") {
        return Some(format!("{prefix}.pdf"));
    }
    url.strip_suffix(".pd").map(|prefix| format!("{prefix}.pdf"))
}

/// Compiled PDF whitelist; a link must match at least one pattern.
#[derive(Debug, Clone, Default)]
pub struct PdfWhitelist {
    patterns: Vec<Regex>,
}

impl PdfWhitelist {
    /// # Errors
    ///
    /// Returns the first pattern that fails to compile.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, regex::Error> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    #[must_use]
    pub fn is_allowed(&self, url: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(url))
    }
}

/// Stock, chart, quote, news and foreign-holding pages are never PDFs.
#[must_use]
pub fn is_blocked_pdf_url(url: &str) -> bool {
    BLOCKED_PDF_RES.iter().any(|re| re.is_match(url))
}

/// Listing title links that point at non-report pages.
#[must_use]
pub fn is_blocked_listing_href(href: &str, allow_item_links: bool) -> bool {
    if ALWAYS_BLOCKED_LISTING_PATHS.iter().any(|p| href.contains(p)) {
        return true;
    }
    !allow_item_links && ITEM_LISTING_PATHS.iter().any(|p| href.contains(p))
}

#[cfg(test)]
#[path = "urls_test.rs"]
mod tests;
