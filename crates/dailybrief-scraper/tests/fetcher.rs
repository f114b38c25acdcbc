//! Integration tests for `HttpFetcher` against a local wiremock server.

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dailybrief_scraper::{Agent, HttpFetcher, ScraperError};

const MOBILE_UA: &str = "dailybrief-test-mobile/0.1";

fn test_fetcher(max_retries: u32) -> HttpFetcher {
    HttpFetcher::new(5, "dailybrief-test/0.1", MOBILE_UA, max_retries, 0)
        .expect("failed to build test fetcher")
}

#[tokio::test]
async fn fetch_page_decodes_body_and_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/research/invest_list.naver"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>리서치</html>".as_bytes(), "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/research/invest_list.naver", server.uri());
    let page = test_fetcher(0)
        .fetch_page(&url, Agent::Desktop)
        .await
        .expect("page should load");

    assert!(page.is_success());
    assert_eq!(page.status, 200);
    assert_eq!(page.body, "<html>리서치</html>");
    assert_eq!(page.final_url, url);
    assert!(page
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("text/html")));
}

#[tokio::test]
async fn non_success_status_is_returned_not_raised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("gone"))
        .mount(&server)
        .await;

    let page = test_fetcher(0)
        .fetch_page(&format!("{}/missing", server.uri()), Agent::Desktop)
        .await
        .expect("404 is a response, not an error");

    assert_eq!(page.status, 404);
    assert!(!page.is_success());
}

#[tokio::test]
async fn rate_limit_is_retried_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/research/company_list.naver"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/research/company_list.naver"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let page = test_fetcher(3)
        .fetch_page(
            &format!("{}/research/company_list.naver", server.uri()),
            Agent::Desktop,
        )
        .await
        .expect("third attempt should succeed");

    assert_eq!(page.body, "ok");
}

#[tokio::test]
async fn persistent_rate_limit_surfaces_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .expect(2)
        .mount(&server)
        .await;

    let err = test_fetcher(1)
        .fetch_page(&format!("{}/busy", server.uri()), Agent::Desktop)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScraperError::RateLimited { retry_after_secs: 7, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn mobile_agent_overrides_user_agent_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/viewer"))
        .and(header("user-agent", MOBILE_UA))
        .respond_with(ResponseTemplate::new(200).set_body_string("mobile"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/viewer"))
        .respond_with(ResponseTemplate::new(200).set_body_string("desktop"))
        .mount(&server)
        .await;

    let fetcher = test_fetcher(0);
    let url = format!("{}/viewer", server.uri());
    let mobile = fetcher.fetch_page(&url, Agent::Mobile).await.unwrap();
    let desktop = fetcher.fetch_page(&url, Agent::Desktop).await.unwrap();

    assert_eq!(mobile.body, "mobile");
    assert_eq!(desktop.body, "desktop");
}

#[tokio::test]
async fn fetch_bytes_returns_raw_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/report.pdf"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.5 fake".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;

    let resp = test_fetcher(0)
        .fetch_bytes(&format!("{}/report.pdf", server.uri()))
        .await
        .unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.bytes, b"%PDF-1.5 fake");
    assert_eq!(resp.content_type_lower(), "application/pdf");
}
