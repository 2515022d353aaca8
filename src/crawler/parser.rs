//! Anchor extraction for stored documents
//!
//! Only `<a href>` values are collected. Relative resolution is deliberately
//! simple: a root-relative href is appended to the full source URL as a
//! string, and every other href is passed through untouched. Links that end
//! up on another domain (including unresolved relative paths) are dropped by
//! the selection pipeline, not here.

use scraper::{Html, Selector};

/// Parses raw markup into a document
pub fn parse_document(markup: &str) -> Html {
    Html::parse_document(markup)
}

/// Extracts candidate link URLs from a parsed document
///
/// # Rules
///
/// - Every `<a>` element contributes its `href`; a missing attribute counts as empty
/// - An href starting with `/` becomes `source_url + href`
/// - Empty hrefs and bare `#` are dropped
/// - Duplicates are kept; the frontier resolves them
///
/// # Example
///
/// ```
/// use sumi_selector::crawler::{extract_links, parse_document};
///
/// let doc = parse_document(r##"<a href="/foo">Foo</a><a href="#">Top</a>"##);
/// let links = extract_links(&doc, "http://x.com/page");
/// assert_eq!(links, vec!["http://x.com/page/foo".to_string()]);
/// ```
pub fn extract_links(document: &Html, source_url: &str) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a") {
        for element in document.select(&a_selector) {
            let href = element.value().attr("href").unwrap_or("");

            let link = if href.starts_with('/') {
                format!("{}{}", source_url, href)
            } else {
                href.to_string()
            };

            if link.is_empty() || link == "#" {
                continue;
            }

            links.push(link);
        }
    }

    links
}
