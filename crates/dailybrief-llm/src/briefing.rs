//! Daily briefing composition from per-report summaries.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use dailybrief_core::{Analysis, ReportSummary};

use crate::client::OpenAiClient;

/// Categories that always lead the briefing, in this order.
pub const CATEGORY_ORDER: [&str; 4] = ["투자정보", "종목분석", "산업분석", "경제분석"];

const UNCATEGORIZED: &str = "기타";

pub const BRIEFING_SYSTEM_PROMPT: &str = "증권사 리포트 정보 정리 전문가. \
리포트 원문 내용을 정확하게 정리만 한다. 추론, 해석, 결론 도출 금지. \
모든 정보는 리포트 원문에서 직접 추출한 사실만 나열. \
불필요한 질문이나 마무리 문구는 절대 포함하지 않음.";

const RESPONSE_TEMPLATE: &str = r#"---
**응답 형식:**

## 1. 종목 분석 (종목별 정리)

### [종목명] (증권사: OO증권)
- **투자의견**: [BUY/SELL/HOLD 등 리포트 원문]
- **목표가**: [수치] ([상향/하향/유지] - 리포트에 명시된 경우만)
- **핵심 전망**:
  1. [리포트 원문 내용 그대로]
  2. [리포트 원문 내용 그대로]
  3. [추가 내용]
- **리스크 요인**: [리포트에 명시된 리스크만 그대로]

[모든 종목 동일 형식으로 나열]

---

## 2. 산업 분석 (산업별 정리)

### [산업명] (증권사: OO증권, OO증권 외 다수)
- **업황 전망**: [리포트 원문 내용]
- **핵심 이슈**:
  1. [리포트 원문 내용]
  2. [리포트 원문 내용]
- **증권사 의견**:
  - OO증권: "[증권사 원문 그대로]"
  - OO증권: "[증권사 원문 그대로]"

[모든 산업 동일 형식]

---

## 3. 거시·시장 전망 (전문가 의견 정리)

### 코스피 전망
- **OO증권**: [리포트 원문 내용 그대로]
- **OO증권**: [리포트 원문 내용 그대로]

### 환율·금리 전망
- **OO증권**: [리포트 원문 내용 그대로]
- **OO증권**: [리포트 원문 내용 그대로]

### 기타 거시 이슈
- [리포트 원문 내용 그대로 나열]

---

## 4. 중요 일정·체크포인트 (리포트 캘린더)

### 실적 발표 예정
- [종목명]: [리포트 원문 내용]

### 이벤트 일정
- [이벤트명]: [리포트 원문 내용]

### 주요 지표 발표일
- [지표명]: [리포트 원문 내용]

---

**작성 규칙:**
- 모든 정보는 리포트 원문에서 직접 추출
- "증권사: OO증권" 표기 필수
- 목표가, 투자의견 등 구체적 수치 그대로 기록
- LLM 추론/해석 금지, 사실 나열만
- "원하시면", "추가로 제공" 같은 질문 금지
- 마무리 문구 금지"#;

/// Summaries grouped by category: the fixed categories first, then any other
/// category in name order. Within a category, input order is kept.
#[must_use]
pub fn group_by_category(summaries: &[ReportSummary]) -> Vec<(String, Vec<&ReportSummary>)> {
    let mut groups: BTreeMap<&str, Vec<&ReportSummary>> = BTreeMap::new();
    for summary in summaries {
        let category = if summary.category.trim().is_empty() {
            UNCATEGORIZED
        } else {
            summary.category.as_str()
        };
        groups.entry(category).or_default().push(summary);
    }

    let mut ordered = Vec::with_capacity(groups.len());
    for category in CATEGORY_ORDER {
        if let Some(items) = groups.remove(category) {
            ordered.push((category.to_owned(), items));
        }
    }
    ordered.extend(
        groups
            .into_iter()
            .map(|(category, items)| (category.to_owned(), items)),
    );
    ordered
}

/// `\n### {category} ({n}건)\n- {summary} ({company})…` per category.
#[must_use]
pub fn category_sections(summaries: &[ReportSummary]) -> String {
    group_by_category(summaries)
        .into_iter()
        .map(|(category, items)| {
            let lines = items
                .iter()
                .map(|s| format!("- {} ({})", s.summary, s.company))
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n### {category} ({}건)\n{lines}", items.len())
        })
        .collect()
}

#[must_use]
pub fn briefing_prompt(sections: &str, top_keywords: &str) -> String {
    let keywords = if top_keywords.is_empty() {
        "N/A"
    } else {
        top_keywords
    };
    format!(
        "위 리포트 내용을 **정확하게 정리**하라. 모든 정보는 리포트 원문에서 추출한 내용만 사용하라.\n\
         \n\
         **금지 사항:**\n\
         - LLM의 추론, 해석, 결론 도출\n\
         - \"매수 권고\" 등의 액션 제안\n\
         - 목표가/현재가 비교로 수익률 계산\n\
         - \"30% 비중\" 등의 비중 제안\n\
         - \"매수가/익절가/손절가\" 등 LLM 재창조\n\
         \n\
         **필수: 리포트 원문 정보만 기록**\n\
         \n\
         {sections}\n\
         \n\
         [키워드 분석]\n\
         {keywords}\n\
         \n\
         {RESPONSE_TEMPLATE}"
    )
}

#[must_use]
pub fn briefing_header(date: NaiveDate, total_reports: usize) -> String {
    format!(
        "# {} 일일 증권사 리포트 브리핑\n\n*총 {total_reports}건 기반 / {} 발행*\n\n",
        date.format("%Y-%m-%d"),
        date.format("%Y.%m.%d"),
    )
}

/// Compose the full briefing document. A failed completion becomes the body
/// `[브리핑 생성 실패: …]`; the header is always present.
pub async fn compose_briefing(
    client: &OpenAiClient,
    model: &str,
    summaries: &[ReportSummary],
    analysis: &Analysis,
    date: NaiveDate,
) -> String {
    let prompt = briefing_prompt(
        &category_sections(summaries),
        &analysis.top_keywords_display(),
    );

    let body = match client.chat(model, BRIEFING_SYSTEM_PROMPT, &prompt).await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(model, error = %e, "briefing composition failed");
            format!("[브리핑 생성 실패: {e}]")
        }
    };

    format!("{}{body}", briefing_header(date, analysis.total_reports))
}

#[cfg(test)]
#[path = "briefing_test.rs"]
mod tests;
