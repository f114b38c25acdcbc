//! Report body recovery from an HTML document.
//!
//! Tries a short list of known content containers, then class-name guesses,
//! then the whole document, then the longest plausible block. The result is
//! rejected when it looks like an error page or advertising boilerplate.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::html::{
    char_len, collapse_whitespace, document_text_excluding, joined_text, selector, stripped_text,
    truncate_chars,
};

/// Maximum characters kept from any extracted body.
pub const MAX_BODY_CHARS: usize = 3500;

const MIN_SELECTOR_CHARS: usize = 100;
const MIN_BODY_CHARS: usize = 100;
const MIN_BODY_CHARS_SHINHAN: usize = 50;
/// Only the head of the selector list is tried.
const SELECTOR_ATTEMPTS: usize = 5;
const AD_CHECK_BELOW_CHARS: usize = 500;

const CONTENT_SELECTORS: [&str; 21] = [
    "td.view_cnt",
    "div.view_cnt",
    "td.view_content",
    "table.view",
    "div.view_con",
    "div.tb_view",
    "div.article_view",
    "div.article_view_con",
    "section.article",
    "div#articleBody",
    "div#wrap_view",
    "div#wrapContent",
    "div#contentArea",
    "div.article_body",
    "div.end_body",
    "div.tb_type1",
    "div.tb_cont",
    "div.board_view",
    "article",
    "div.content",
    "#content",
];

const SHINHAN_SELECTORS: [&str; 7] = [
    "div.view_cont",
    "td.view_cont",
    "div.article_content",
    "div.content_body",
    "div#content_detail",
    "div.report_view",
    "div.article_view",
];

const EXCLUDED_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

const ERROR_TEXTS: [&str; 4] = [
    "방문하시려는 페이지의 주소가 잘못",
    "페이지의 주소가 변경",
    "삭제되었거나",
    "네이버 :: 세상의 모든 지식",
];

static CLASS_BLOCKS: LazyLock<Selector> = LazyLock::new(|| selector("td[class], div[class]"));
static TEXT_BLOCKS: LazyLock<Selector> =
    LazyLock::new(|| selector("p, td, div, article, section, span"));

static CONTENT_CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)view|content|article|report").expect("valid regex"));
static NOISE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)목록|조회|신한투자증권 리서치 탐색기|네이버|삭제|오류|주식거래")
        .expect("valid regex")
});
static AD_RES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?is)네이버 주식거래연결.*빠른 주문.*도와드립니다").expect("valid regex"),
        Regex::new(r"(?is)^.{0,100}주석.*결론.*참고.*$").expect("valid regex"),
    ]
});

/// Recover the report body from `html`. Returns an empty string when nothing
/// usable is found. Shinhan pages get extra selectors and a lower minimum
/// length.
#[must_use]
pub fn extract_body_text(html: &str, shinhan: bool) -> String {
    let doc = Html::parse_document(html);

    let mut text = by_selectors(&doc, shinhan);

    if char_len(&text) < MIN_SELECTOR_CHARS {
        if let Some(found) = by_content_class(&doc) {
            text = found;
        }
    }

    if char_len(&text) < MIN_SELECTOR_CHARS {
        text = document_text_excluding(&doc, &EXCLUDED_TAGS, "\n");
        if char_len(&text) < MIN_SELECTOR_CHARS {
            if let Some(found) = longest_block(&doc, shinhan) {
                text = found;
            }
        }
    }

    validate_body(&text, shinhan)
}

fn by_selectors(doc: &Html, shinhan: bool) -> String {
    let shinhan_first = if shinhan { &SHINHAN_SELECTORS[..] } else { &[][..] };
    shinhan_first
        .iter()
        .chain(CONTENT_SELECTORS.iter())
        .take(SELECTOR_ATTEMPTS)
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|sel| {
            let element = doc.select(&sel).next()?;
            let text = joined_text(element, "\n");
            (char_len(&text) > MIN_SELECTOR_CHARS).then_some(text)
        })
        .unwrap_or_default()
}

fn by_content_class(doc: &Html) -> Option<String> {
    doc.select(&CLASS_BLOCKS)
        .filter(|el| {
            el.value()
                .attr("class")
                .is_some_and(|c| CONTENT_CLASS_RE.is_match(c))
        })
        .map(stripped_text)
        .filter(|t| char_len(t) > MIN_SELECTOR_CHARS)
        .max_by_key(|t| char_len(t))
}

fn longest_block(doc: &Html, shinhan: bool) -> Option<String> {
    let floor = if shinhan {
        MIN_BODY_CHARS_SHINHAN
    } else {
        MIN_BODY_CHARS
    };
    doc.select(&TEXT_BLOCKS)
        .map(|el| joined_text(el, " "))
        .filter(|t| char_len(t) >= floor && !NOISE_RE.is_match(t))
        .max_by_key(|t| char_len(t))
}

/// Normalize whitespace and apply the error-page, length, and advertising
/// checks.
#[must_use]
pub fn validate_body(text: &str, shinhan: bool) -> String {
    let text = collapse_whitespace(text);

    if ERROR_TEXTS.iter().any(|e| text.contains(e)) {
        tracing::debug!("body rejected as error page");
        return String::new();
    }

    let min_chars = if shinhan {
        MIN_BODY_CHARS_SHINHAN
    } else {
        MIN_BODY_CHARS
    };
    let len = char_len(&text);
    if len < min_chars {
        tracing::debug!(len, min_chars, "body too short");
        return String::new();
    }

    if len < AD_CHECK_BELOW_CHARS && AD_RES.iter().any(|re| re.is_match(&text)) {
        tracing::debug!(len, "body rejected as advertising");
        return String::new();
    }

    truncate_chars(&text, MAX_BODY_CHARS)
}

#[cfg(test)]
#[path = "body_test.rs"]
mod tests;
