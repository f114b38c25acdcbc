use serde::{Deserialize, Serialize};

/// Research portal a report was listed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Naver,
    Hankyung,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Naver => write!(f, "naver"),
            SourceKind::Hankyung => write!(f, "hankyung"),
        }
    }
}

/// One row of a research listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Display name of the portal (`네이버`, `한경컨센서스`).
    pub source: String,
    pub category: String,
    pub title: String,
    /// Issuing brokerage.
    pub company: String,
    /// Listing date as printed on the portal, normalized to `.` separators.
    pub date: String,
    /// HTML detail page, when one usable for text extraction exists.
    pub url: Option<String>,
    /// PDF attachment link as discovered on the listing or detail page.
    pub pdf_url: Option<String>,
}

impl Report {
    /// Shinhan reports ship as framed HTML viewers and get relaxed extraction
    /// thresholds.
    #[must_use]
    pub fn is_shinhan(&self) -> bool {
        is_shinhan_company(&self.company)
    }
}

#[must_use]
pub fn is_shinhan_company(company: &str) -> bool {
    company.contains("신한")
}

/// Where the text that fed a summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Pdf,
    Html,
    None,
}

impl std::fmt::Display for ContentSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentSource::Pdf => write!(f, "pdf"),
            ContentSource::Html => write!(f, "html"),
            ContentSource::None => write!(f, "none"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub title: String,
    pub company: String,
    pub category: String,
    pub summary: String,
    pub content_source: ContentSource,
}
