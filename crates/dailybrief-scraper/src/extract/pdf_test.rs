use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};

use super::*;

/// Build an in-memory PDF whose page `n` shows the text `Page n`.
fn numbered_pdf(page_count: u32) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for n in 1..=page_count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => i64::from(page_count),
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn short_documents_read_every_page() {
    assert_eq!(pages_to_read(&[1, 2, 3]), vec![1, 2, 3]);
    assert_eq!(pages_to_read(&[1, 2, 3, 4, 5, 6, 7]), vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn long_documents_read_head_and_tail() {
    let pages: Vec<u32> = (1..=20).collect();
    assert_eq!(pages_to_read(&pages), vec![1, 2, 3, 4, 5, 18, 19, 20]);
}

#[test]
fn empty_document_reads_nothing() {
    assert!(pages_to_read(&[]).is_empty());
}

#[test]
fn extracts_text_from_selected_pages() {
    let bytes = numbered_pdf(10);
    let text = pdf_text_from_bytes("https://a.example/r.pdf", &bytes).unwrap();
    for n in [1, 2, 3, 4, 5, 8, 9] {
        assert!(text.contains(&format!("Page {n}")), "missing page {n}: {text}");
    }
    assert!(!text.contains("Page 6"), "{text}");
    assert!(!text.contains("Page 7"), "{text}");
    assert!(!text.contains('\n'));
}

#[test]
fn garbage_bytes_are_a_pdf_error() {
    let err = pdf_text_from_bytes("https://a.example/r.pdf", b"<html>not a pdf</html>").unwrap_err();
    assert!(matches!(err, ScraperError::Pdf { .. }));
}

#[tokio::test]
async fn parse_blocking_runs_off_the_runtime() {
    let text = parse_blocking("https://a.example/r.pdf".to_owned(), numbered_pdf(1))
        .await
        .unwrap();
    assert!(text.contains("Page 1"));
}
