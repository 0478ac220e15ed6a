//! HTML parsing support.
//!
//! This module turns an HTML string into the arena [`Document`] used by the
//! converter. With the `html` feature the full html5ever parser (via
//! scraper) is used; without it, or if that parser panics, the input is
//! reduced to plain text inside a synthetic body.

use once_cell::sync::Lazy;
use regex::Regex;

use mailmark_core::collapse_whitespace;

use crate::node::Document;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").unwrap());

/// Parse an HTML string into a Document.
///
/// Never fails: a parser that is unavailable or crashes yields the degraded
/// plain-text document instead.
///
/// # Example
///
/// ```rust
/// use mailmark::parse_html;
///
/// let document = parse_html("<h1>Hello <em>World</em></h1>");
/// assert_eq!(document.body().text_content(), "Hello World");
/// ```
#[cfg(feature = "html")]
pub fn parse_html(html: &str) -> Document {
    match std::panic::catch_unwind(|| scraper_document(html)) {
        Ok(document) => document,
        Err(_) => {
            tracing::warn!("HTML parser failed, falling back to plain-text document");
            fallback_document(html)
        }
    }
}

/// Parse an HTML string into a Document.
///
/// Built without the `html` feature, so only the degraded plain-text
/// document is available.
#[cfg(not(feature = "html"))]
pub fn parse_html(html: &str) -> Document {
    tracing::debug!("built without an HTML parser, using plain-text document");
    fallback_document(html)
}

/// Degraded document: tags removed, whitespace collapsed, one text node.
pub fn fallback_document(html: &str) -> Document {
    let text = TAG_RE.replace_all(html, " ");
    Document::degraded(collapse_whitespace(&text).trim())
}

#[cfg(feature = "html")]
fn scraper_document(html: &str) -> Document {
    use scraper::{ElementRef, Html, Node as ScraperNode};

    let parsed = Html::parse_document(html);
    let root = parsed.root_element();
    let mut document = Document::with_root_attrs(root.value().name(), root.value().attrs().collect());

    // Explicit work list: nesting depth of the input must not grow the call stack.
    let mut pending = vec![(document.root_id(), root)];
    while let Some((parent, element)) = pending.pop() {
        for child in element.children() {
            match child.value() {
                ScraperNode::Text(text) => {
                    document.append_text(parent, &text.text);
                }
                ScraperNode::Comment(comment) => {
                    document.append_comment(parent, &comment.comment);
                }
                ScraperNode::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        let value = child_element.value();
                        let id =
                            document.append_element(parent, value.name(), value.attrs().collect());
                        pending.push((id, child_element));
                    }
                }
                _ => {}
            }
        }
    }
    document
}
