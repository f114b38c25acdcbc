use super::*;

fn summary(source: ContentSource) -> ReportSummary {
    ReportSummary {
        title: "t".to_string(),
        company: "c".to_string(),
        category: "산업".to_string(),
        summary: "s".to_string(),
        content_source: source,
    }
}

#[test]
fn content_sources_are_counted() {
    let summaries = vec![
        summary(ContentSource::Pdf),
        summary(ContentSource::None),
        summary(ContentSource::Pdf),
        summary(ContentSource::Html),
    ];
    assert_eq!(content_source_counts(&summaries), (2, 1, 1));
}

#[test]
fn no_summaries_count_zero() {
    assert_eq!(content_source_counts(&[]), (0, 0, 0));
}

#[test]
fn report_line_marks_available_links() {
    let report = Report {
        source: "네이버".to_string(),
        category: "종목분석".to_string(),
        title: "삼성전자 HBM 수요 확대".to_string(),
        company: "미래에셋증권".to_string(),
        date: "25.10.24".to_string(),
        url: None,
        pdf_url: Some("https://stock.pstatic.net/stock-research/company/1.pdf".to_string()),
    };

    assert_eq!(
        report_line(&report),
        "[25.10.24] 종목분석 | 삼성전자 HBM 수요 확대 (미래에셋증권) | PDF=O HTML=X"
    );
}

#[test]
fn default_run_options_publish_on_weekdays() {
    let options = RunOptions::default();
    assert!(!options.dry_run);
    assert!(!options.force);
    assert_eq!(options.lookback_days, None);
}

#[tokio::test]
async fn run_without_openai_key_fails_before_any_work() {
    let mut config = dailybrief_core::load_app_config_from_env()
        .expect("defaults should load without any env vars");
    config.openai_api_key = None;
    config.sources_path = "/nonexistent/sources.yaml".into();

    let options = RunOptions {
        force: true,
        ..RunOptions::default()
    };
    let err = run(&config, &options).await.unwrap_err();
    assert!(err.to_string().contains("OPENAI_API_KEY"), "got: {err:#}");
}
