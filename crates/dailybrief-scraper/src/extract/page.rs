//! Report page navigation: meta-refresh chains and framed viewers.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::client::{Agent, FetchedPage, HttpFetcher};
use crate::html::selector;
use crate::urls::resolve;

use super::debug::DebugSnapshots;

const MAX_META_REDIRECTS: usize = 3;
/// Meta refresh is only looked for in the first characters of the document.
const META_SCAN_CHARS: usize = 10_000;
const MIN_FRAME_CHARS: usize = 1_000;

const ERROR_PAGE_MARKERS: [&str; 3] = [
    "페이지를 찾을 수 없습니다",
    "찾으시는 모든 정보",
    "404 Not Found",
];
const CONTENT_FRAME_KEYWORDS: [&str; 6] = ["경쟁사", "이익률", "매출", "전망", "증권", "리포트"];

static META: LazyLock<Selector> = LazyLock::new(|| selector("meta[http-equiv]"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("title"));
static IFRAME: LazyLock<Selector> = LazyLock::new(|| selector("iframe[src]"));
static FRAME: LazyLock<Selector> = LazyLock::new(|| selector("frame[src]"));
static REFRESH_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)url=([^";\s]+)"#).expect("valid regex"));

/// Portal "not found" pages are served with status 200.
#[must_use]
pub fn is_error_page(html: &str) -> bool {
    if ERROR_PAGE_MARKERS.iter().any(|m| html.contains(m)) {
        return true;
    }
    let doc = Html::parse_document(html);
    doc.select(&TITLE).next().is_some_and(|t| {
        let title: String = t.text().collect();
        title.contains("404") && title.contains("네이버")
    })
}

/// Target of a `<meta http-equiv="refresh">` near the top of the page,
/// resolved against `current_url`.
#[must_use]
pub fn meta_refresh_target(html: &str, current_url: &str) -> Option<String> {
    let doc = Html::parse_document(head_chars(html, META_SCAN_CHARS));
    doc.select(&META)
        .filter(|m| {
            m.value()
                .attr("http-equiv")
                .is_some_and(|v| v.eq_ignore_ascii_case("refresh"))
        })
        .filter_map(|m| m.value().attr("content"))
        .find_map(|content| {
            let raw = REFRESH_URL_RE.captures(content)?.get(1)?.as_str();
            let target = raw.trim().trim_matches(|c| c == '\'' || c == '"');
            resolve(current_url, target)
        })
}

/// Frame sources to try, resolved against `base_url`: every `iframe`, or
/// every `frame` when the page has no iframes.
#[must_use]
pub fn frame_sources(html: &str, base_url: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let collect = |sel: &Selector| -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for src in doc.select(sel).filter_map(|f| f.value().attr("src")) {
            let src = src.trim();
            if src.is_empty() || src.starts_with("javascript:") || src == "about:blank" {
                continue;
            }
            if let Some(url) = resolve(base_url, src) {
                if !out.contains(&url) {
                    out.push(url);
                }
            }
        }
        out
    };
    let iframes = collect(&IFRAME);
    if iframes.is_empty() {
        collect(&FRAME)
    } else {
        iframes
    }
}

/// A frame document that plausibly holds report text.
#[must_use]
pub fn is_content_frame(html: &str) -> bool {
    longer_than(html, MIN_FRAME_CHARS) && CONTENT_FRAME_KEYWORDS.iter().any(|k| html.contains(k))
}

/// The first `max` characters of `text`.
fn head_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

fn longer_than(text: &str, chars: usize) -> bool {
    text.chars().nth(chars).is_some()
}

fn is_shinhan_frame(url: &str) -> bool {
    url.to_ascii_lowercase().contains("shinhaninvest")
}

/// Load a report page, following meta refreshes and descending into frames.
///
/// Returns `None` when the page cannot be fetched or is an error page.
pub(crate) async fn load_report_page(
    fetcher: &HttpFetcher,
    debug: Option<&DebugSnapshots>,
    url: &str,
    company: &str,
    shinhan: bool,
) -> Option<String> {
    let mut page = fetch_or_log(fetcher, url, Agent::Desktop).await?;
    let mut is_error = !page.is_success() || is_error_page(&page.body);

    let mut visited: HashSet<String> = HashSet::new();
    let mut redirects = 0;
    while !is_error && redirects < MAX_META_REDIRECTS {
        let current = page.final_url.clone();
        if !visited.insert(current.clone()) {
            tracing::debug!(url = %current, "meta refresh loop detected");
            break;
        }
        let Some(next) = meta_refresh_target(&page.body, &current) else {
            break;
        };
        if visited.contains(&next) {
            tracing::debug!(url = %next, "meta refresh target already visited");
            break;
        }
        tracing::debug!(from = %current, to = %next, redirect = redirects + 1, "following meta refresh");
        let Some(next_page) = fetch_or_log(fetcher, &next, Agent::Desktop).await else {
            break;
        };
        page = next_page;
        redirects += 1;
        is_error = !page.is_success() || is_error_page(&page.body);
    }

    if is_error {
        tracing::warn!(url, status = page.status, "report page is an error page");
        if shinhan {
            if let Some(debug) = debug {
                debug.save("404", company, &page.body).await;
            }
        }
        return None;
    }

    if shinhan {
        if let Some(debug) = debug {
            debug.save("ok", company, &page.body).await;
        }
    }

    match frame_document(fetcher, &page).await {
        Some(html) => Some(html),
        None => Some(page.body),
    }
}

/// First frame (or nested frame) that carries report content.
async fn frame_document(fetcher: &HttpFetcher, page: &FetchedPage) -> Option<String> {
    let frames = frame_sources(&page.body, &page.final_url);
    if frames.is_empty() {
        return None;
    }
    tracing::debug!(url = %page.final_url, frames = frames.len(), "inspecting frames");

    for src in frames {
        if is_shinhan_frame(&src) {
            if let Some(frame) = fetch_or_log(fetcher, &src, Agent::Mobile).await {
                if longer_than(&frame.body, MIN_FRAME_CHARS) {
                    return Some(frame.body);
                }
            }
            continue;
        }

        let Some(frame) = fetch_or_log(fetcher, &src, Agent::Desktop).await else {
            continue;
        };
        for inner in frame_sources(&frame.body, &frame.final_url) {
            if let Some(inner_page) = fetch_or_log(fetcher, &inner, Agent::Desktop).await {
                if is_content_frame(&inner_page.body) {
                    return Some(inner_page.body);
                }
            }
        }
        if is_content_frame(&frame.body) {
            return Some(frame.body);
        }
    }

    tracing::debug!(url = %page.final_url, "no frame with report content; using top-level page");
    None
}

async fn fetch_or_log(fetcher: &HttpFetcher, url: &str, agent: Agent) -> Option<FetchedPage> {
    match fetcher.fetch_page(url, agent).await {
        Ok(page) => Some(page),
        Err(e) => {
            tracing::warn!(url, error = %e, "page fetch failed");
            None
        }
    }
}
