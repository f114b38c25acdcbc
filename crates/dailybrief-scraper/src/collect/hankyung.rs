//! Hankyung Consensus listing (`/analysis/list`).

use std::sync::LazyLock;
use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use dailybrief_core::dates::normalize_listing_date;
use dailybrief_core::{ListingConfig, Report, SourceConfig, TargetDates};

use crate::client::{Agent, HttpFetcher};
use crate::error::ScraperError;
use crate::html::{selector, stripped_text};
use crate::urls::resolve;

static ROWS: LazyLock<Selector> = LazyLock::new(|| selector("table tbody tr"));
static TD: LazyLock<Selector> = LazyLock::new(|| selector("td"));
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| selector("a"));

/// Parse a consensus listing. Columns are `[제목, 증권사, 분류, 작성일, ...]`.
#[must_use]
pub fn parse_listing(
    html: &str,
    source: &SourceConfig,
    listing: &ListingConfig,
    dates: &TargetDates,
) -> Vec<Report> {
    let doc = Html::parse_document(html);
    let mut reports = Vec::new();

    for row in doc.select(&ROWS) {
        let cols: Vec<ElementRef<'_>> = row.select(&TD).collect();
        if cols.len() < 4 {
            continue;
        }

        let date = normalize_listing_date(&stripped_text(cols[3]));
        if !dates.matches(&date) {
            continue;
        }

        let Some(title_link) = cols[0].select(&ANCHOR).next() else {
            continue;
        };
        let Some(url) = title_link
            .value()
            .attr("href")
            .and_then(|href| resolve(&source.base_url, href))
        else {
            continue;
        };

        let pdf_url = row
            .select(&ANCHOR)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| href.trim().to_ascii_lowercase().ends_with(".pdf"))
            .and_then(|href| resolve(&source.base_url, href));

        let mut category = stripped_text(cols[2]);
        if category.is_empty() {
            category.clone_from(&listing.category);
        }

        reports.push(Report {
            source: source.name.clone(),
            category,
            title: stripped_text(title_link),
            company: stripped_text(cols[1]),
            date,
            url: Some(url),
            pdf_url,
        });
    }

    reports
}

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
        match fetch_listing(fetcher, &page_url).await {
            Ok(body) => {
                let found = parse_listing(&body, source, listing, dates);
                tracing::info!(
                    source = %source.name,
                    category = %listing.category,
                    collected = found.len(),
                    "listing collected"
                );
                reports.extend(found);
            }
            Err(e) => {
                tracing::warn!(
                    source = %source.name,
                    url = %page_url,
                    error = %e,
                    "listing fetch failed; skipping"
                );
            }
        }
    }

    reports
}

async fn fetch_listing(fetcher: &HttpFetcher, page_url: &str) -> Result<String, ScraperError> {
    let page = fetcher.fetch_page(page_url, Agent::Desktop).await?;
    if !page.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: page.status,
            url: page_url.to_owned(),
        });
    }
    Ok(page.body)
}
