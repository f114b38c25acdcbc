//! Title keyword statistics and category counts for a day's reports.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::report::Report;

const TOP_KEYWORDS: usize = 10;

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[가-힣A-Za-z0-9]{2,12}").expect("valid regex"));
static DATE_LIKE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2}월|\d{1,2}일|20\d{2}|\d{2}\.\d{2}|\d{4}\.\d{2}\.\d{2}|\d주차|\d[QH]\d{2})")
        .expect("valid regex")
});
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").expect("valid regex"));

const STOP_WORDS: [&str; 15] = [
    "리포트", "분석", "전망", "투자", "경제", "산업", "이슈", "Weekly", "Preview", "Monitor",
    "Daily", "주간", "주차", "일보", "China",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub total_reports: usize,
    pub top_keywords: Vec<KeywordCount>,
    pub category_summary: Vec<CategoryCount>,
    /// Deduplicated reports, in listing order.
    pub reports: Vec<Report>,
}

impl Analysis {
    /// `keyword(n회), keyword(n회), ...` as shown in the briefing and the
    /// published page properties.
    #[must_use]
    pub fn top_keywords_display(&self) -> String {
        self.top_keywords
            .iter()
            .map(|k| format!("{}({}회)", k.keyword, k.count))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `{category: n, ...}` rendering of the category counts.
    #[must_use]
    pub fn category_summary_display(&self) -> String {
        let inner = self
            .category_summary
            .iter()
            .map(|c| format!("{}: {}", c.category, c.count))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{inner}}}")
    }
}

/// Deduplicate reports by `(title, company)` and compute keyword and category
/// statistics over the survivors.
#[must_use]
pub fn analyze(reports: &[Report], today: NaiveDate) -> Analysis {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let deduped: Vec<Report> = reports
        .iter()
        .filter(|r| seen.insert((r.title.as_str(), r.company.as_str())))
        .cloned()
        .collect();

    let stop_words = stop_words_for(today);
    let tokens = deduped
        .iter()
        .flat_map(|r| TOKEN_RE.find_iter(&r.title).map(|m| m.as_str().to_string()))
        .filter(|w| is_keyword(w, &stop_words));

    let top_keywords = count_in_first_seen_order(tokens)
        .into_iter()
        .take(TOP_KEYWORDS)
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect();

    let category_summary = count_in_first_seen_order(deduped.iter().map(|r| r.category.clone()))
        .into_iter()
        .map(|(category, count)| CategoryCount { category, count })
        .collect();

    Analysis {
        total_reports: deduped.len(),
        top_keywords,
        category_summary,
        reports: deduped,
    }
}

fn stop_words_for(today: NaiveDate) -> HashSet<String> {
    let mut words: HashSet<String> = STOP_WORDS.iter().map(|w| (*w).to_string()).collect();
    words.insert(today.day().to_string());
    words.insert(today.month().to_string());
    words.insert(today.year().to_string());
    words.insert(format!("{}월", today.month()));
    words
}

fn is_keyword(word: &str, stop_words: &HashSet<String>) -> bool {
    word.chars().count() >= 2
        && !stop_words.contains(word)
        && !DATE_LIKE_RE.is_match(word)
        && !NUMBER_RE.is_match(word)
}

/// Count occurrences and sort by count descending; ties keep first-seen order.
fn count_in_first_seen_order<I>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for item in items {
        if let Some(&i) = index.get(&item) {
            counts[i].1 += 1;
        } else {
            index.insert(item.clone(), counts.len());
            counts.push((item, 1));
        }
    }
    // Stable sort keeps insertion order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
