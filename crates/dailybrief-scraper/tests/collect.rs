//! Integration tests for listing collection. Each test points the source
//! `base_url` at a local wiremock server.

use std::time::Duration;

use chrono::NaiveDate;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dailybrief_core::{ListingConfig, SourceConfig, SourceKind, SourcesFile, TargetDates};
use dailybrief_scraper::{collect_all, HttpFetcher};

fn test_fetcher() -> HttpFetcher {
    HttpFetcher::new(5, "dailybrief-test/0.1", "dailybrief-test-mobile/0.1", 0, 0)
        .expect("failed to build test fetcher")
}

fn dates() -> TargetDates {
    TargetDates::for_day(NaiveDate::from_ymd_opt(2025, 10, 24).unwrap(), 1)
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html; charset=utf-8")
}

fn naver_source(base_url: &str) -> SourceConfig {
    SourceConfig {
        name: "네이버".to_string(),
        kind: SourceKind::Naver,
        base_url: base_url.to_string(),
        pdf_url_patterns: vec![],
        listings: vec![
            ListingConfig {
                category: "종목분석".to_string(),
                path: "/research/company_list.naver".to_string(),
                allow_item_links: true,
            },
            ListingConfig {
                category: "산업분석".to_string(),
                path: "/research/industry_list.naver".to_string(),
                allow_item_links: false,
            },
        ],
    }
}

const COMPANY_LIST: &str = r#"
<html><body>
<table class="type_1">
  <tr><th>종목명</th><th>제목</th><th>증권사</th><th>첨부</th><th>작성일</th><th>조회수</th></tr>
  <tr>
    <td><a href="/item/main.naver?code=005930">삼성전자</a></td>
    <td><a href="company_read.naver?nid=1001&page=1">HBM 수요 회복 가시화</a></td>
    <td>KB증권</td>
    <td><a href="https://stock.pstatic.net/stock-research/company/61/1001.pdf"><img alt="PDF"></a></td>
    <td>25.10.24</td>
    <td>120</td>
  </tr>
  <tr>
    <td><a href="/item/main.naver?code=000660">SK하이닉스</a></td>
    <td><a href="company_read.naver?nid=1002&page=1">메모리 업황 점검</a></td>
    <td>신한투자증권</td>
    <td></td>
    <td>25.10.24</td>
    <td>98</td>
  </tr>
  <tr>
    <td><a href="/item/main.naver?code=035420">NAVER</a></td>
    <td><a href="company_read.naver?nid=990&page=1">지난주 리포트</a></td>
    <td>NH투자증권</td>
    <td></td>
    <td>25.10.23</td>
    <td>10</td>
  </tr>
</table>
</body></html>
"#;

const DETAIL_1002: &str = r#"
<html><body>
<div class="view_info">
  <a href="/attach/1002.pdf" class="con_link">리포트보기</a>
</div>
</body></html>
"#;

#[tokio::test]
async fn naver_collection_finds_pdfs_on_rows_and_detail_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/research/company_list.naver"))
        .respond_with(html(COMPANY_LIST))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/research/company_read.naver"))
        .and(query_param("nid", "1002"))
        .respond_with(html(DETAIL_1002))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/research/industry_list.naver"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let sources = SourcesFile {
        sources: vec![naver_source(&server.uri())],
    };
    let reports = collect_all(&test_fetcher(), &sources, &dates(), Duration::ZERO).await;

    assert_eq!(reports.len(), 2, "{reports:?}");

    let first = &reports[0];
    assert_eq!(first.source, "네이버");
    assert_eq!(first.category, "종목분석");
    assert_eq!(first.title, "HBM 수요 회복 가시화");
    assert_eq!(first.company, "KB증권");
    assert_eq!(first.date, "25.10.24");
    assert_eq!(
        first.pdf_url.as_deref(),
        Some("https://stock.pstatic.net/stock-research/company/61/1001.pdf")
    );
    assert_eq!(
        first.url,
        Some(format!(
            "{}/research/company_read.naver?nid=1001&page=1",
            server.uri()
        ))
    );

    let second = &reports[1];
    assert_eq!(second.company, "신한투자증권");
    assert_eq!(
        second.pdf_url,
        Some(format!("{}/attach/1002.pdf", server.uri()))
    );
}

#[tokio::test]
async fn missing_listing_table_yields_no_reports() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<html><body><p>점검 중입니다</p></body></html>"))
        .mount(&server)
        .await;

    let sources = SourcesFile {
        sources: vec![naver_source(&server.uri())],
    };
    let reports = collect_all(&test_fetcher(), &sources, &dates(), Duration::ZERO).await;

    assert!(reports.is_empty());
}

const HANKYUNG_LIST: &str = r#"
<html><body>
<table>
  <thead><tr><th>제목</th><th>증권사</th><th>분류</th><th>작성일</th><th>첨부</th></tr></thead>
  <tbody>
    <tr>
      <td><a href="/analysis/view?report_idx=77">반도체 사이클 재점검</a></td>
      <td>한국투자증권</td>
      <td>산업</td>
      <td>2025-10-24</td>
      <td><a href="/apps.analysis/analysis.downpdf?report_idx=77.pdf">PDF</a></td>
    </tr>
    <tr>
      <td><a href="/analysis/view?report_idx=78">통화정책 전망</a></td>
      <td>메리츠증권</td>
      <td></td>
      <td>2025-10-24</td>
      <td></td>
    </tr>
    <tr>
      <td><a href="/analysis/view?report_idx=60">지난 리포트</a></td>
      <td>대신증권</td>
      <td>기업</td>
      <td>2025-10-22</td>
      <td></td>
    </tr>
  </tbody>
</table>
</body></html>
"#;

#[tokio::test]
async fn hankyung_collection_reads_category_column() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/analysis/list"))
        .respond_with(html(HANKYUNG_LIST))
        .mount(&server)
        .await;

    let sources = SourcesFile {
        sources: vec![SourceConfig {
            name: "한경컨센서스".to_string(),
            kind: SourceKind::Hankyung,
            base_url: server.uri(),
            pdf_url_patterns: vec![],
            listings: vec![ListingConfig {
                category: "한경컨센서스".to_string(),
                path: "/analysis/list".to_string(),
                allow_item_links: false,
            }],
        }],
    };
    let reports = collect_all(&test_fetcher(), &sources, &dates(), Duration::ZERO).await;

    assert_eq!(reports.len(), 2, "{reports:?}");
    assert_eq!(reports[0].category, "산업");
    assert_eq!(reports[0].date, "2025.10.24");
    assert_eq!(
        reports[0].pdf_url,
        Some(format!(
            "{}/apps.analysis/analysis.downpdf?report_idx=77.pdf",
            server.uri()
        ))
    );
    assert_eq!(reports[1].category, "한경컨센서스");
    assert_eq!(reports[1].pdf_url, None);
    assert_eq!(
        reports[1].url,
        Some(format!("{}/analysis/view?report_idx=78", server.uri()))
    );
}
