//! Naver Finance research listings (`/research/*_list.naver`).

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use dailybrief_core::{ListingConfig, Report, SourceConfig, TargetDates};
use dailybrief_core::dates::normalize_listing_date;

use crate::client::{Agent, HttpFetcher};
use crate::error::ScraperError;
use crate::html::{selector, stripped_text};
use crate::urls::{is_absolute_http, is_blocked_listing_href, resolve};

static ROW_SELECTORS: LazyLock<[Selector; 4]> = LazyLock::new(|| {
    [
        selector("table.type_1 tbody tr"),
        selector("table tbody tr"),
        selector("tbody tr"),
        selector("tr"),
    ]
});
static TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table"));
static TD: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));
static IMG: LazyLock<Selector> = LazyLock::new(|| selector("img"));
static SVG: LazyLock<Selector> = LazyLock::new(|| selector("svg"));

static ROW_PDF_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.pdf|download|filekey|attach|report|view").expect("valid regex")
});
static DETAIL_PDF_HREF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)download|view|filekey|attach|\.pdf").expect("valid regex")
});
static DETAIL_PDF_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)리포트보기|PDF|다운로드|보기").expect("valid regex"));
static DETAIL_PDF_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)pdf|download|report").expect("valid regex"));

/// One accepted listing row before the detail-page PDF lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub title: String,
    pub company: String,
    pub date: String,
    pub detail_url: String,
    pub pdf_url: Option<String>,
}

/// Parse a research listing page into rows dated within `dates`.
///
/// Relative links are resolved against `page_url`.
///
/// # Errors
///
/// Returns [`ScraperError::MissingTable`] when the page contains no table.
pub fn parse_listing(
    html: &str,
    page_url: &str,
    listing: &ListingConfig,
    dates: &TargetDates,
) -> Result<Vec<ListingRow>, ScraperError> {
    let doc = Html::parse_document(html);
    if doc.select(&TABLE).next().is_none() {
        return Err(ScraperError::MissingTable {
            url: page_url.to_owned(),
        });
    }

    let rows: Vec<ElementRef<'_>> = ROW_SELECTORS
        .iter()
        .map(|sel| doc.select(sel).collect::<Vec<_>>())
        .find(|rows| !rows.is_empty())
        .unwrap_or_default();

    let mut parsed = Vec::new();
    for row in rows {
        let cols: Vec<ElementRef<'_>> = row.select(&TD).collect();
        if cols.len() < 4 {
            continue;
        }

        let raw_date = stripped_text(date_column(&cols));
        if !dates.matches(&raw_date) {
            continue;
        }

        let Some(title_link) = title_link(&cols) else {
            continue;
        };
        let href = title_link.value().attr("href").unwrap_or_default().trim();
        if href.is_empty() || href == "#" {
            continue;
        }
        if is_blocked_listing_href(href, listing.allow_item_links) {
            tracing::debug!(category = %listing.category, href, "skipping non-report link");
            continue;
        }
        let Some(detail_url) = resolve(page_url, href) else {
            continue;
        };

        let mut company = stripped_text(cols[2]);
        if company.is_empty() {
            company = stripped_text(cols[1]);
        }

        parsed.push(ListingRow {
            title: stripped_text(title_link),
            company,
            date: normalize_listing_date(&raw_date),
            detail_url,
            pdf_url: find_row_pdf(&cols, page_url),
        });
    }
    Ok(parsed)
}

/// First anchor of column 0, else column 1. A stock-page link in column 0
/// (the `종목명` cell) yields to the report link next to it.
fn title_link<'a>(cols: &[ElementRef<'a>]) -> Option<ElementRef<'a>> {
    let first = cols[0].select(&ANCHOR).next();
    let second = cols[1].select(&ANCHOR).next();
    match (first, second) {
        (Some(stock), Some(report)) if is_stock_link(stock) && !is_stock_link(report) => {
            Some(report)
        }
        (Some(first), _) => Some(first),
        (None, second) => second,
    }
}

fn is_stock_link(anchor: ElementRef<'_>) -> bool {
    anchor
        .value()
        .attr("href")
        .is_some_and(|h| h.contains("/item/") || h.contains("/frgn/"))
}

/// `[종목명, 제목, 증권사, 첨부, 작성일, 조회수]` keeps the date in column 4;
/// the five-column layout drops the stock name.
fn date_column<'a>(cols: &[ElementRef<'a>]) -> ElementRef<'a> {
    match cols.len() {
        n if n >= 6 => cols[4],
        5 => cols[3],
        n => cols[n - 2],
    }
}

fn find_row_pdf(cols: &[ElementRef<'_>], page_url: &str) -> Option<String> {
    for col in cols {
        if let Some(href) = col
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| !href.is_empty() && ROW_PDF_HREF_RE.is_match(href))
        {
            return resolve(page_url, href);
        }

        let first_href = || {
            col.select(&ANCHOR)
                .next()
                .and_then(|a| a.value().attr("href"))
                .filter(|href| !href.is_empty())
        };

        if let Some(img) = col.select(&IMG).next() {
            let label = format!(
                "{}{}",
                img.value().attr("alt").unwrap_or_default(),
                img.value().attr("title").unwrap_or_default()
            );
            if label.to_lowercase().contains("pdf") {
                if let Some(href) = first_href() {
                    return resolve(page_url, href);
                }
            }
        }

        if col.select(&SVG).next().is_some() {
            if let Some(href) = first_href() {
                let lower = href.to_lowercase();
                if lower.contains(".pdf") || lower.contains("download") || lower.contains("filekey")
                {
                    return resolve(page_url, href);
                }
            }
        }
    }
    None
}

/// Look for an attachment link on a report's detail page: by href, then by
/// link text, then by class.
#[must_use]
pub fn find_detail_pdf_link(html: &str, page_url: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let anchors: Vec<ElementRef<'_>> = doc.select(&ANCHOR).collect();

    let found = anchors
        .iter()
        .find(|a| anchor_href(a).is_some_and(|h| DETAIL_PDF_HREF_RE.is_match(h)))
        .or_else(|| {
            anchors
                .iter()
                .find(|a| DETAIL_PDF_TEXT_RE.is_match(&stripped_text(**a)))
        })
        .or_else(|| {
            anchors.iter().find(|a| {
                a.value()
                    .attr("class")
                    .is_some_and(|c| DETAIL_PDF_CLASS_RE.is_match(c))
            })
        })?;

    let href = anchor_href(found).filter(|h| !h.is_empty() && *h != "#")?;
    resolve(page_url, href)
}

fn anchor_href<'a>(anchor: &ElementRef<'a>) -> Option<&'a str> {
    anchor.value().attr("href").map(str::trim)
}

/// Detail pages double as the HTML fallback unless they are stock pages.
fn html_url_for(detail_url: &str) -> Option<String> {
    (is_absolute_http(detail_url) && !detail_url.contains("/item/")).then(|| detail_url.to_owned())
}

/// Collect every configured Naver listing. A failing listing is logged and
/// skipped.
pub(crate) async fn collect(
    fetcher: &HttpFetcher,
    source: &SourceConfig,
    dates: &TargetDates,
    inter_request_delay: Duration,
) -> Vec<Report> {
    let mut reports = Vec::new();

    for (idx, listing) in source.listings.iter().enumerate() {
        if idx > 0 && !inter_request_delay.is_zero() {
            tokio::time::sleep(inter_request_delay).await;
        }

        let page_url = source.listing_url(listing);
        let rows = match fetch_listing_rows(fetcher, &page_url, listing, dates).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    source = %source.name,
                    category = %listing.category,
                    url = %page_url,
                    error = %e,
                    "listing fetch failed; skipping category"
                );
                continue;
            }
        };

        let before = reports.len();
        for row in rows {
            let pdf_url = match row.pdf_url {
                Some(url) => Some(url),
                None => detail_page_pdf(fetcher, &row.detail_url).await,
            };
            if pdf_url.is_none() {
                tracing::debug!(
                    company = %row.company,
                    title = %row.title,
                    "no attachment link; HTML fallback only"
                );
            }
            reports.push(Report {
                source: source.name.clone(),
                category: listing.category.clone(),
                url: html_url_for(&row.detail_url),
                title: row.title,
                company: row.company,
                date: row.date,
                pdf_url,
            });
        }

        tracing::info!(
            source = %source.name,
            category = %listing.category,
            collected = reports.len() - before,
            "listing collected"
        );
    }

    reports
}

async fn fetch_listing_rows(
    fetcher: &HttpFetcher,
    page_url: &str,
    listing: &ListingConfig,
    dates: &TargetDates,
) -> Result<Vec<ListingRow>, ScraperError> {
    let page = fetcher.fetch_page(page_url, Agent::Desktop).await?;
    if !page.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: page.status,
            url: page_url.to_owned(),
        });
    }
    parse_listing(&page.body, &page.final_url, listing, dates)
}

async fn detail_page_pdf(fetcher: &HttpFetcher, detail_url: &str) -> Option<String> {
    match fetcher.fetch_page(detail_url, Agent::Desktop).await {
        Ok(page) if page.is_success() => find_detail_pdf_link(&page.body, &page.final_url),
        Ok(page) => {
            tracing::debug!(url = %detail_url, status = page.status, "detail page unavailable");
            None
        }
        Err(e) => {
            tracing::debug!(url = %detail_url, error = %e, "detail page fetch failed");
            None
        }
    }
}

#[cfg(test)]
#[path = "naver_test.rs"]
mod tests;
