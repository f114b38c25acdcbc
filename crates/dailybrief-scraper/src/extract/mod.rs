//! Report text extraction.
//!
//! [`Extractor::extract`] tries the PDF attachment first and the HTML detail
//! page second. It never fails: every problem is logged and the report comes
//! back with empty text and [`ContentSource::None`].

pub mod body;
pub mod cache;
pub mod debug;
pub mod page;
pub mod pdf;

use std::sync::Arc;

use dailybrief_core::{ContentSource, Report};

use crate::client::HttpFetcher;
use crate::urls::{is_blocked_pdf_url, PdfWhitelist};

pub use body::{extract_body_text, MAX_BODY_CHARS};
pub use cache::PdfCache;
pub use debug::DebugSnapshots;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub text: String,
    pub content_source: ContentSource,
}

impl Extraction {
    #[must_use]
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            content_source: ContentSource::None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct Extractor {
    fetcher: HttpFetcher,
    whitelist: PdfWhitelist,
    cache: Option<Arc<PdfCache>>,
    debug: Option<DebugSnapshots>,
}

impl Extractor {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, whitelist: PdfWhitelist) -> Self {
        Self {
            fetcher,
            whitelist,
            cache: None,
            debug: None,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<PdfCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_debug_snapshots(mut self, debug: DebugSnapshots) -> Self {
        self.debug = Some(debug);
        self
    }

    #[must_use]
    pub fn fetcher(&self) -> &HttpFetcher {
        &self.fetcher
    }

    pub async fn extract(&self, report: &Report) -> Extraction {
        if let Some(pdf_url) = &report.pdf_url {
            let text = self.pdf_text(pdf_url).await;
            if !text.is_empty() {
                tracing::debug!(company = %report.company, chars = text.chars().count(), "PDF text extracted");
                return Extraction {
                    text,
                    content_source: ContentSource::Pdf,
                };
            }
        }

        if let Some(url) = &report.url {
            let text = self.html_text(url, &report.company, report.is_shinhan()).await;
            if !text.is_empty() {
                tracing::debug!(company = %report.company, chars = text.chars().count(), "HTML text extracted");
                return Extraction {
                    text,
                    content_source: ContentSource::Html,
                };
            }
        }

        tracing::info!(
            title = %report.title,
            company = %report.company,
            pdf_url = ?report.pdf_url,
            url = ?report.url,
            "no body text recovered"
        );
        Extraction::empty()
    }

    /// Text of a PDF attachment, or an empty string.
    pub async fn pdf_text(&self, pdf_url: &str) -> String {
        if !self.whitelist.is_allowed(pdf_url) {
            tracing::debug!(url = pdf_url, "PDF link not whitelisted");
            return String::new();
        }
        if is_blocked_pdf_url(pdf_url) {
            tracing::debug!(url = pdf_url, "PDF link points at a blocked page");
            return String::new();
        }

        if let Some(cached) = self.cache.as_ref().and_then(|c| c.get(pdf_url)) {
            tracing::debug!(url = pdf_url, "PDF cache hit");
            return cached;
        }

        let Some(download) = pdf::download(&self.fetcher, pdf_url).await else {
            return String::new();
        };

        match pdf::parse_blocking(download.url, download.bytes).await {
            Ok(text) => {
                if !text.is_empty() {
                    if let Some(cache) = &self.cache {
                        cache.insert(pdf_url, &text);
                    }
                }
                text
            }
            Err(e) => {
                tracing::warn!(url = pdf_url, error = %e, "PDF parse failed");
                String::new()
            }
        }
    }

    /// Text of an HTML report page, or an empty string.
    pub async fn html_text(&self, url: &str, company: &str, shinhan: bool) -> String {
        let Some(html) =
            page::load_report_page(&self.fetcher, self.debug.as_ref(), url, company, shinhan).await
        else {
            return String::new();
        };
        extract_body_text(&html, shinhan)
    }
}
