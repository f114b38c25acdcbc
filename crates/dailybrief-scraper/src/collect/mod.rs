//! Listing collectors for the research portals.

pub mod hankyung;
pub mod naver;

use std::time::Duration;

use dailybrief_core::{Report, SourceKind, SourcesFile, TargetDates};

use crate::client::HttpFetcher;

/// Collect reports from every configured source, in configuration order.
///
/// Collection is best-effort: a listing that cannot be fetched or parsed is
/// logged and skipped, so the result may be partial or empty.
pub async fn collect_all(
    fetcher: &HttpFetcher,
    sources: &SourcesFile,
    dates: &TargetDates,
    inter_request_delay: Duration,
) -> Vec<Report> {
    let mut reports = Vec::new();

    for source in &sources.sources {
        tracing::info!(
            source = %source.name,
            kind = %source.kind,
            dates = ?dates.display_labels(),
            "collecting listings"
        );
        let found = match source.kind {
            SourceKind::Naver => naver::collect(fetcher, source, dates, inter_request_delay).await,
            SourceKind::Hankyung => {
                hankyung::collect(fetcher, source, dates, inter_request_delay).await
            }
        };
        if found.is_empty() {
            tracing::warn!(source = %source.name, "no reports collected");
        }
        reports.extend(found);
    }

    tracing::info!(total = reports.len(), "collection finished");
    reports
}
