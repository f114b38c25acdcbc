//! Page and block payloads for the briefing database entry.

use chrono::NaiveDate;
use serde::Serialize;

use dailybrief_core::Analysis;

/// Longest rich-text value Notion accepts in a property.
pub const MAX_PROPERTY_CHARS: usize = 2_000;
/// Briefing text per paragraph block.
pub const PARAGRAPH_CHARS: usize = 1_800;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPage {
    pub parent: Parent,
    pub properties: BriefingProperties,
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parent {
    pub database_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BriefingProperties {
    #[serde(rename = "Name")]
    pub name: TitleProperty,
    #[serde(rename = "Date")]
    pub date: DateProperty,
    #[serde(rename = "총 리포트 수")]
    pub total_reports: NumberProperty,
    #[serde(rename = "Top Keywords")]
    pub top_keywords: RichTextProperty,
    #[serde(rename = "Category Summary")]
    pub category_summary: RichTextProperty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TitleProperty {
    pub title: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateProperty {
    pub date: DateValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateValue {
    /// `YYYY-MM-DD`.
    pub start: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberProperty {
    pub number: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichTextProperty {
    pub rich_text: Vec<RichText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RichText {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: TextContent,
}

impl RichText {
    #[must_use]
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextContent {
    pub content: String,
}

/// A paragraph block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    pub object: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub paragraph: Paragraph,
}

impl Block {
    #[must_use]
    pub fn paragraph(content: impl Into<String>) -> Self {
        Self {
            object: "block",
            kind: "paragraph",
            paragraph: Paragraph {
                rich_text: vec![RichText::plain(content)],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    pub rich_text: Vec<RichText>,
}

/// Split `text` into pieces of at most `max_chars` characters.
#[must_use]
pub fn split_chars(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// The database entry for one day's briefing.
#[must_use]
pub fn build_briefing_page(
    database_id: &str,
    date: NaiveDate,
    analysis: &Analysis,
    briefing: &str,
) -> NewPage {
    let date_label = date.format("%Y-%m-%d").to_string();

    NewPage {
        parent: Parent {
            database_id: database_id.to_owned(),
        },
        properties: BriefingProperties {
            name: TitleProperty {
                title: vec![RichText::plain(format!("{date_label} 일일 브리핑"))],
            },
            date: DateProperty {
                date: DateValue { start: date_label },
            },
            total_reports: NumberProperty {
                number: analysis.total_reports,
            },
            top_keywords: RichTextProperty {
                rich_text: vec![RichText::plain(truncate(
                    &analysis.top_keywords_display(),
                    MAX_PROPERTY_CHARS,
                ))],
            },
            category_summary: RichTextProperty {
                rich_text: vec![RichText::plain(truncate(
                    &analysis.category_summary_display(),
                    MAX_PROPERTY_CHARS,
                ))],
            },
        },
        children: split_chars(briefing, PARAGRAPH_CHARS)
            .into_iter()
            .map(Block::paragraph)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use dailybrief_core::{analyze, Report};
    use serde_json::json;

    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 24).unwrap()
    }

    fn analysis() -> Analysis {
        let reports = vec![Report {
            source: "네이버".to_string(),
            category: "종목분석".to_string(),
            title: "HBM 수요 회복".to_string(),
            company: "KB증권".to_string(),
            date: "25.10.24".to_string(),
            url: None,
            pdf_url: None,
        }];
        analyze(&reports, day())
    }

    #[test]
    fn split_respects_character_boundaries() {
        let text = "가".repeat(4_000);
        let parts = split_chars(&text, PARAGRAPH_CHARS);
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].chars().count(), 1_800);
        assert_eq!(parts[2].chars().count(), 400);
    }

    #[test]
    fn empty_text_has_no_blocks() {
        assert!(split_chars("", PARAGRAPH_CHARS).is_empty());
    }

    #[test]
    fn page_serializes_to_notion_shape() {
        let page = build_briefing_page("db-1", day(), &analysis(), "# 브리핑");
        let value = serde_json::to_value(&page).unwrap();

        assert_eq!(value["parent"], json!({ "database_id": "db-1" }));
        assert_eq!(
            value["properties"]["Name"]["title"][0]["text"]["content"],
            "2025-10-24 일일 브리핑"
        );
        assert_eq!(value["properties"]["Date"]["date"]["start"], "2025-10-24");
        assert_eq!(value["properties"]["총 리포트 수"]["number"], 1);
        assert_eq!(
            value["properties"]["Category Summary"]["rich_text"][0]["text"]["content"],
            "{종목분석: 1}"
        );
        assert_eq!(
            value["children"][0],
            json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": {
                    "rich_text": [{ "type": "text", "text": { "content": "# 브리핑" } }]
                }
            })
        );
    }

    #[test]
    fn long_properties_are_truncated() {
        let mut analysis = analysis();
        analysis.top_keywords = (0..600)
            .map(|i| dailybrief_core::KeywordCount {
                keyword: format!("키워드{i}"),
                count: 1,
            })
            .collect();
        let page = build_briefing_page("db", day(), &analysis, "");
        let content = &page.properties.top_keywords.rich_text[0].text.content;
        assert_eq!(content.chars().count(), MAX_PROPERTY_CHARS);
    }
}
