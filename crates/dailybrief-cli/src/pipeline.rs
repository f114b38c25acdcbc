//! The daily briefing run: collect, analyze, extract and summarize, compose,
//! publish.
//!
//! Per-report and per-source failures are logged and skipped. Only setup
//! failures (unreadable sources file, unbuildable clients) abort a run.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};

use dailybrief_core::{
    analyze, is_weekend, load_sources, today_kst, Analysis, AppConfig, ContentSource, Report,
    ReportSummary, SourcesFile, TargetDates,
};
use dailybrief_llm::{compose_briefing, summarize_report, OpenAiClient};
use dailybrief_notion::{build_briefing_page, NotionClient};
use dailybrief_scraper::{
    collect_all, DebugSnapshots, Extractor, HttpFetcher, PdfCache, PdfWhitelist,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunOptions {
    pub dry_run: bool,
    pub force: bool,
    pub lookback_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    SkippedWeekend,
    NoReports,
    Completed {
        reports: usize,
        page_id: Option<String>,
    },
}

/// Run the full pipeline for today (Korea time).
///
/// # Errors
///
/// Returns an error if `OPENAI_API_KEY` is missing, the sources file cannot
/// be loaded or a client cannot be built. Collection, extraction, summary and publishing failures are
/// logged and do not fail the run.
pub(crate) async fn run(config: &AppConfig, options: &RunOptions) -> anyhow::Result<RunOutcome> {
    let api_key = config.openai_api_key()?;
    let today = today_kst();
    if is_weekend(today) && !options.force {
        tracing::info!(%today, "weekend; skipping briefing (use --force to override)");
        return Ok(RunOutcome::SkippedWeekend);
    }

    let sources = load_sources(&config.sources_path).with_context(|| {
        format!(
            "loading sources from {}",
            config.sources_path.display()
        )
    })?;
    let cache = Arc::new(PdfCache::load(&config.pdf_cache_path));
    let extractor = build_extractor(config, &sources, Arc::clone(&cache))?;

    let lookback = options.lookback_days.unwrap_or(config.lookback_days);
    let reports = collect(config, extractor.fetcher(), &sources, today, lookback).await;
    if reports.is_empty() {
        tracing::info!(%today, "no reports listed for the target dates");
        return Ok(RunOutcome::NoReports);
    }

    let analysis = analyze(&reports, today);
    tracing::info!(
        collected = reports.len(),
        unique = analysis.total_reports,
        keywords = %analysis.top_keywords_display(),
        "analysis complete"
    );

    let llm = OpenAiClient::with_base_url(
        api_key,
        config.llm_timeout_secs,
        &config.openai_base_url,
    )
    .context("building chat-completions client")?;

    let summaries = summarize_all(config, &extractor, &llm, &analysis.reports).await;
    let (pdf, html, none) = content_source_counts(&summaries);
    tracing::info!(
        summaries = summaries.len(),
        pdf,
        html,
        none,
        "report summaries complete"
    );

    if let Err(e) = cache.save() {
        tracing::warn!(error = %e, "failed to save PDF cache");
    }

    let briefing =
        compose_briefing(&llm, &config.briefing_model, &summaries, &analysis, today).await;
    tracing::info!(chars = briefing.chars().count(), "briefing composed");

    let page_id = if options.dry_run {
        println!("{briefing}");
        None
    } else {
        publish(config, today, &analysis, &briefing).await
    };

    Ok(RunOutcome::Completed {
        reports: analysis.total_reports,
        page_id,
    })
}

/// Collect and analyze, then print the analysis. No extraction or model calls.
///
/// # Errors
///
/// Returns an error if the sources file or the HTTP client cannot be set up.
pub(crate) async fn collect_only(
    config: &AppConfig,
    lookback_days: Option<u32>,
) -> anyhow::Result<()> {
    let today = today_kst();
    let sources = load_sources(&config.sources_path).with_context(|| {
        format!(
            "loading sources from {}",
            config.sources_path.display()
        )
    })?;
    let fetcher = HttpFetcher::from_config(config).context("building HTTP client")?;

    let lookback = lookback_days.unwrap_or(config.lookback_days);
    let reports = collect(config, &fetcher, &sources, today, lookback).await;
    let analysis = analyze(&reports, today);

    println!("total reports: {}", analysis.total_reports);
    println!("top keywords: {}", analysis.top_keywords_display());
    println!("categories: {}", analysis.category_summary_display());
    for report in &analysis.reports {
        println!("{}", report_line(report));
    }
    Ok(())
}

/// Extract one ad-hoc report and print what was recovered.
///
/// # Errors
///
/// Returns an error if the sources file or the HTTP client cannot be set up.
pub(crate) async fn extract_one(
    config: &AppConfig,
    url: Option<String>,
    pdf_url: Option<String>,
    company: String,
) -> anyhow::Result<()> {
    let sources = load_sources(&config.sources_path).with_context(|| {
        format!(
            "loading sources from {}",
            config.sources_path.display()
        )
    })?;
    let cache = Arc::new(PdfCache::load(&config.pdf_cache_path));
    let extractor = build_extractor(config, &sources, cache)?;

    let report = Report {
        source: "manual".to_string(),
        category: String::new(),
        title: String::new(),
        company,
        date: String::new(),
        url,
        pdf_url,
    };
    let extraction = extractor.extract(&report).await;

    println!(
        "source: {} ({} chars)",
        extraction.content_source,
        extraction.text.chars().count()
    );
    println!("{}", extraction.text);
    Ok(())
}

fn build_extractor(
    config: &AppConfig,
    sources: &SourcesFile,
    cache: Arc<PdfCache>,
) -> anyhow::Result<Extractor> {
    let fetcher = HttpFetcher::from_config(config).context("building HTTP client")?;
    let whitelist = PdfWhitelist::new(&sources.pdf_url_patterns())
        .context("compiling PDF URL whitelist")?;

    let mut extractor = Extractor::new(fetcher, whitelist).with_cache(cache);
    if let Some(dir) = &config.debug_html_dir {
        tracing::info!(dir = %dir.display(), "saving report page snapshots");
        extractor = extractor.with_debug_snapshots(DebugSnapshots::new(dir.clone()));
    }
    Ok(extractor)
}

async fn collect(
    config: &AppConfig,
    fetcher: &HttpFetcher,
    sources: &SourcesFile,
    today: NaiveDate,
    lookback_days: u32,
) -> Vec<Report> {
    let dates = TargetDates::for_day(today, lookback_days);
    collect_all(
        fetcher,
        sources,
        &dates,
        Duration::from_millis(config.scraper_inter_request_delay_ms),
    )
    .await
}

/// Extract and summarize every report with bounded concurrency. Summaries
/// come back in listing order.
async fn summarize_all(
    config: &AppConfig,
    extractor: &Extractor,
    llm: &OpenAiClient,
    reports: &[Report],
) -> Vec<ReportSummary> {
    let total = reports.len();
    let max_concurrent = config.max_concurrent_reports.max(1);

    let mut indexed: Vec<(usize, ReportSummary)> =
        stream::iter(reports.iter().cloned().enumerate())
            .map(|(idx, report)| async move {
                let extraction = extractor.extract(&report).await;
                let summary = summarize_report(
                    llm,
                    &config.summary_model,
                    &report,
                    &extraction.text,
                    extraction.content_source,
                )
                .await;
                tracing::info!(
                    done = idx + 1,
                    total,
                    company = %report.company,
                    title = %report.title,
                    source = %summary.content_source,
                    "report summarized"
                );
                (idx, summary)
            })
            .buffer_unordered(max_concurrent)
            .collect()
            .await;

    indexed.sort_by_key(|(idx, _)| *idx);
    indexed.into_iter().map(|(_, summary)| summary).collect()
}

/// Publish to Notion when credentials are configured. Returns the page id.
async fn publish(
    config: &AppConfig,
    today: NaiveDate,
    analysis: &Analysis,
    briefing: &str,
) -> Option<String> {
    let Some((api_key, database_id)) = config.notion_credentials() else {
        tracing::warn!("NOTION_API_KEY / NOTION_DATABASE_ID not set; printing briefing instead");
        println!("{briefing}");
        return None;
    };

    let client = match NotionClient::with_base_url(
        api_key,
        config.llm_timeout_secs,
        &config.notion_base_url,
    ) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "cannot build Notion client");
            return None;
        }
    };

    let page = build_briefing_page(database_id, today, analysis, briefing);
    match client.publish(&page).await {
        Ok(published) => {
            tracing::info!(
                page_id = %published.id,
                url = ?published.url,
                blocks = page.children.len(),
                "briefing published"
            );
            Some(published.id)
        }
        Err(e) => {
            tracing::error!(error = %e, "briefing publish failed");
            None
        }
    }
}

/// `(pdf, html, none)` counts.
pub(crate) fn content_source_counts(summaries: &[ReportSummary]) -> (usize, usize, usize) {
    summaries
        .iter()
        .fold((0, 0, 0), |(pdf, html, none), s| match s.content_source {
            ContentSource::Pdf => (pdf + 1, html, none),
            ContentSource::Html => (pdf, html + 1, none),
            ContentSource::None => (pdf, html, none + 1),
        })
}

/// One line of `collect` output.
pub(crate) fn report_line(report: &Report) -> String {
    let mark = |present: bool| if present { "O" } else { "X" };
    format!(
        "[{}] {} | {} ({}) | PDF={} HTML={}",
        report.date,
        report.category,
        report.title,
        report.company,
        mark(report.pdf_url.is_some()),
        mark(report.url.is_some()),
    )
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
