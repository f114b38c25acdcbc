//! Text helpers over `scraper` documents.

use scraper::{ElementRef, Html, Node, Selector};

/// Parse a CSS selector that is known at compile time.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid selector")
}

/// All descendant text joined with `separator`, trimmed at both ends.
pub(crate) fn joined_text(element: ElementRef<'_>, separator: &str) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_owned()
}

/// Descendant text fragments, each trimmed, empty ones dropped, joined with a
/// single space.
pub(crate) fn stripped_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-document text joined with `separator`, skipping anything inside an
/// element named in `excluded`.
pub(crate) fn document_text_excluding(doc: &Html, excluded: &[&str], separator: &str) -> String {
    doc.tree
        .root()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some((node, &**text)),
            _ => None,
        })
        .filter(|(node, _)| {
            !node.ancestors().any(|a| {
                a.value()
                    .as_element()
                    .is_some_and(|e| excluded.contains(&e.name()))
            })
        })
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_owned()
}

/// Collapse every whitespace run to a single space and trim.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max_chars` characters of `text`.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}
