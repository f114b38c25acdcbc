use std::io::Write;
use std::path::PathBuf;

use super::*;

fn parse(yaml: &str) -> SourcesFile {
    serde_yaml::from_str(yaml).expect("test yaml parses")
}

const VALID: &str = r"
sources:
  - name: 네이버
    kind: naver
    base_url: https://finance.naver.com
    pdf_url_patterns:
      - 'pstatic\.net/stock-research/.*\.pdf'
    listings:
      - category: 종목분석
        path: /research/company_list.naver
        allow_item_links: true
      - category: 산업분석
        path: research/industry_list.naver
";

#[test]
fn validate_accepts_valid_sources() {
    let file = parse(VALID);
    assert!(validate_sources(&file).is_ok());
    let naver = &file.sources[0];
    assert_eq!(naver.kind, SourceKind::Naver);
    assert!(naver.listings[0].allow_item_links);
    assert!(!naver.listings[1].allow_item_links);
}

#[test]
fn listing_url_joins_with_single_slash() {
    let file = parse(VALID);
    let naver = &file.sources[0];
    assert_eq!(
        naver.listing_url(&naver.listings[0]),
        "https://finance.naver.com/research/company_list.naver"
    );
    assert_eq!(
        naver.listing_url(&naver.listings[1]),
        "https://finance.naver.com/research/industry_list.naver"
    );
}

#[test]
fn validate_rejects_empty_source_list() {
    let file = parse("sources: []");
    let err = validate_sources(&file).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn validate_rejects_duplicate_name() {
    let yaml = r"
sources:
  - name: Naver
    kind: naver
    base_url: https://finance.naver.com
    listings:
      - { category: 투자정보, path: /research/invest_list.naver }
  - name: naver
    kind: naver
    base_url: https://finance.naver.com
    listings:
      - { category: 투자정보, path: /research/invest_list.naver }
";
    let err = validate_sources(&parse(yaml)).unwrap_err();
    assert!(err.to_string().contains("duplicate source name"), "{err}");
}

#[test]
fn validate_rejects_relative_base_url() {
    let yaml = r"
sources:
  - name: 한경
    kind: hankyung
    base_url: consensus.hankyung.com
    listings:
      - { category: 한경컨센서스, path: /analysis/list }
";
    let err = validate_sources(&parse(yaml)).unwrap_err();
    assert!(err.to_string().contains("invalid base_url"), "{err}");
}

#[test]
fn validate_rejects_missing_listings() {
    let yaml = r"
sources:
  - name: 한경
    kind: hankyung
    base_url: https://consensus.hankyung.com
    listings: []
";
    let err = validate_sources(&parse(yaml)).unwrap_err();
    assert!(err.to_string().contains("at least one listing"), "{err}");
}

#[test]
fn validate_rejects_bad_pdf_pattern() {
    let yaml = r"
sources:
  - name: 한경
    kind: hankyung
    base_url: https://consensus.hankyung.com
    pdf_url_patterns: ['(unclosed']
    listings:
      - { category: 한경컨센서스, path: /analysis/list }
";
    let err = validate_sources(&parse(yaml)).unwrap_err();
    assert!(err.to_string().contains("invalid pdf_url_pattern"), "{err}");
}

#[test]
fn unknown_kind_fails_to_parse() {
    let yaml = r"
sources:
  - name: x
    kind: daum
    base_url: https://x.example
    listings: []
";
    assert!(serde_yaml::from_str::<SourcesFile>(yaml).is_err());
}

#[test]
fn load_sources_reports_missing_file() {
    let err = load_sources(Path::new("/nonexistent/sources.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::SourcesFileIo { .. }));
}

#[test]
fn load_sources_reads_file_from_disk() {
    let dir = std::env::temp_dir().join(format!("dailybrief-sources-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("sources.yaml");
    std::fs::File::create(&path)
        .unwrap()
        .write_all(VALID.as_bytes())
        .unwrap();

    let file = load_sources(&path).unwrap();
    assert_eq!(file.sources.len(), 1);
    assert_eq!(file.pdf_url_patterns().len(), 1);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn shipped_sources_file_is_valid() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../config/sources.yaml");
    let file = load_sources(&path).unwrap();
    let kinds: Vec<SourceKind> = file.sources.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SourceKind::Naver, SourceKind::Hankyung]);
    let categories: Vec<&str> = file.sources[0]
        .listings
        .iter()
        .map(|l| l.category.as_str())
        .collect();
    assert_eq!(categories, vec!["투자정보", "종목분석", "산업분석", "경제분석"]);
}
