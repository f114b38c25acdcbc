//! One-sentence summaries of individual reports.

use dailybrief_core::{ContentSource, Report, ReportSummary};

use crate::client::OpenAiClient;

pub const SUMMARY_SYSTEM_PROMPT: &str = "핵심만 1문장으로 요약";

/// Only the head of the extracted body is sent to the model.
pub const BODY_PREVIEW_CHARS: usize = 2_000;

/// User prompt for one report. Without body text the model is asked to infer
/// the gist from the title, issuer and category.
#[must_use]
pub fn summary_prompt(report: &Report, text: &str) -> String {
    if text.is_empty() {
        format!(
            "아래 리포트 제목과 카테고리만 보고 핵심을 1문장으로 추정하라.\n\
             제목: {}\n\
             증권사: {}\n\
             카테고리: {}\n\
             요약 (유추된 주요 내용 1문장):",
            report.title, report.company, report.category
        )
    } else {
        let preview: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
        format!(
            "아래 리포트를 읽고 핵심만 1문장으로 압축하라.\n\
             제목: {}\n\
             증권사: {}\n\
             본문: {preview}\n\
             요약 (기업명+투자포인트 포함):",
            report.title, report.company
        )
    }
}

/// Summarize one report. A failed completion becomes the summary text
/// `[요약 실패: …]` so the briefing still lists the report.
pub async fn summarize_report(
    client: &OpenAiClient,
    model: &str,
    report: &Report,
    text: &str,
    content_source: ContentSource,
) -> ReportSummary {
    let prompt = summary_prompt(report, text);
    let summary = match client.chat(model, SUMMARY_SYSTEM_PROMPT, &prompt).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(
                company = %report.company,
                title = %report.title,
                error = %e,
                "report summary failed"
            );
            format!("[요약 실패: {e}]")
        }
    };

    ReportSummary {
        title: report.title.clone(),
        company: report.company.clone(),
        category: report.category.clone(),
        summary,
        content_source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> Report {
        Report {
            source: "네이버".to_string(),
            category: "산업분석".to_string(),
            title: "2차전지 수요 점검".to_string(),
            company: "미래에셋증권".to_string(),
            date: "25.10.24".to_string(),
            url: None,
            pdf_url: None,
        }
    }

    #[test]
    fn prompt_without_body_asks_for_inference() {
        let prompt = summary_prompt(&report(), "");
        assert!(prompt.starts_with("아래 리포트 제목과 카테고리만 보고"));
        assert!(prompt.contains("제목: 2차전지 수요 점검\n"));
        assert!(prompt.contains("증권사: 미래에셋증권\n"));
        assert!(prompt.contains("카테고리: 산업분석\n"));
        assert!(prompt.ends_with("요약 (유추된 주요 내용 1문장):"));
    }

    #[test]
    fn prompt_with_body_embeds_preview() {
        let prompt = summary_prompt(&report(), "유럽 ESS 수요가 견조하다.");
        assert!(prompt.starts_with("아래 리포트를 읽고 핵심만 1문장으로 압축하라."));
        assert!(prompt.contains("본문: 유럽 ESS 수요가 견조하다.\n"));
        assert!(!prompt.contains("카테고리:"));
    }

    #[test]
    fn body_preview_is_capped() {
        let body = "가".repeat(BODY_PREVIEW_CHARS + 500);
        let prompt = summary_prompt(&report(), &body);
        let preview_len = prompt
            .lines()
            .find_map(|l| l.strip_prefix("본문: "))
            .map(|p| p.chars().count());
        assert_eq!(preview_len, Some(BODY_PREVIEW_CHARS));
    }
}
