//! PDF attachment download and text extraction.

use lopdf::Document;

use crate::client::{FetchedBytes, HttpFetcher};
use crate::error::ScraperError;
use crate::html::{collapse_whitespace, truncate_chars};
use crate::urls::{pdf_url_candidates, strip_query_and_fragment};

use super::body::MAX_BODY_CHARS;

const LEADING_PAGES: usize = 5;
const TRAILING_PAGES: usize = 3;

/// Page numbers to read: the first five and the last three, ascending and
/// without duplicates.
#[must_use]
pub fn pages_to_read(page_numbers: &[u32]) -> Vec<u32> {
    let total = page_numbers.len();
    let mut picked: Vec<u32> = page_numbers
        .iter()
        .take(LEADING_PAGES)
        .chain(page_numbers.iter().skip(total.saturating_sub(TRAILING_PAGES)))
        .copied()
        .collect();
    picked.sort_unstable();
    picked.dedup();
    picked
}

/// Extract, collapse, and truncate the text of a PDF held in memory.
///
/// # Errors
///
/// Returns [`ScraperError::Pdf`] when the document cannot be loaded.
/// Individual pages that fail to decode are skipped.
pub fn pdf_text_from_bytes(url: &str, bytes: &[u8]) -> Result<String, ScraperError> {
    let doc = Document::load_mem(bytes).map_err(|e| ScraperError::Pdf {
        url: url.to_owned(),
        reason: e.to_string(),
    })?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut parts = Vec::new();
    for page in pages_to_read(&page_numbers) {
        match doc.extract_text(&[page]) {
            Ok(text) => parts.push(text),
            Err(e) => tracing::debug!(url, page, error = %e, "skipping undecodable PDF page"),
        }
    }

    Ok(truncate_chars(
        &collapse_whitespace(&parts.join(" ")),
        MAX_BODY_CHARS,
    ))
}

/// Download the first candidate URL that answers 200 and return its bytes.
pub(crate) async fn download(fetcher: &HttpFetcher, raw_url: &str) -> Option<FetchedBytes> {
    let candidates = pdf_url_candidates(raw_url);
    let total = candidates.len();

    let mut found = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        match fetcher.fetch_bytes(&candidate).await {
            Ok(resp) if resp.status == 200 => {
                if idx > 0 {
                    tracing::debug!(url = %candidate, attempt = idx + 1, "PDF candidate succeeded");
                }
                found = Some(resp);
                break;
            }
            Ok(resp) => {
                tracing::debug!(url = %candidate, status = resp.status, attempt = idx + 1, total, "PDF candidate rejected");
            }
            Err(e) => {
                tracing::debug!(url = %candidate, error = %e, attempt = idx + 1, total, "PDF candidate failed");
            }
        }
    }

    let Some(resp) = found else {
        tracing::warn!(url = raw_url, attempts = total, "all PDF candidates failed");
        return None;
    };

    let content_type = resp.content_type_lower();
    if content_type.contains("pdf") || resp.url.to_ascii_lowercase().ends_with(".pdf") {
        return Some(resp);
    }
    if !content_type.starts_with("text/html") {
        // Unlabelled binary: let the parser decide.
        return Some(resp);
    }

    let alternate = format!("{}.pdf", strip_query_and_fragment(&resp.url));
    tracing::debug!(url = %resp.url, alternate = %alternate, "HTML instead of PDF; retrying with .pdf");
    match fetcher.fetch_bytes(&alternate).await {
        Ok(alt) if alt.status == 200 && alt.content_type_lower().contains("pdf") => Some(alt),
        Ok(alt) => {
            tracing::debug!(url = %alternate, status = alt.status, "alternate URL is not a PDF");
            None
        }
        Err(e) => {
            tracing::debug!(url = %alternate, error = %e, "alternate PDF fetch failed");
            None
        }
    }
}

/// Parse on the blocking pool; PDF decoding is CPU-bound.
pub(crate) async fn parse_blocking(url: String, bytes: Vec<u8>) -> Result<String, ScraperError> {
    let task_url = url.clone();
    tokio::task::spawn_blocking(move || pdf_text_from_bytes(&task_url, &bytes))
        .await
        .map_err(|e| ScraperError::Pdf {
            url,
            reason: format!("parse task failed: {e}"),
        })?
}

#[cfg(test)]
#[path = "pdf_test.rs"]
mod tests;
