//! Conversion results and the structural metadata collected alongside them.

use serde::{Deserialize, Serialize};

use mailmark_core::{collapse_whitespace, ConversionOptions};

use crate::email::{extract_headers, is_inline_image, EmailContext, EmailHeaders};
use crate::node::Document;
use crate::utilities::clean_attribute;

/// An image referenced by the document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub is_inline: bool,
}

/// A hyperlink in the document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkInfo {
    pub href: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub is_email: bool,
}

/// Metadata extracted from one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_headers: Option<EmailHeaders>,
    pub images: Vec<ImageInfo>,
    pub links: Vec<LinkInfo>,
}

/// Output of one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub markdown: String,
    pub metadata: DocumentMetadata,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    Some(clean_attribute(value)).filter(|v| !v.is_empty())
}

/// Collect the title, email headers, images and links of a document.
///
/// Headers are only looked for in email content and when
/// `preserve_email_headers` is set.
pub fn extract_metadata(
    doc: &Document,
    context: &EmailContext,
    options: &ConversionOptions,
) -> DocumentMetadata {
    let email_headers = if options.preserve_email_headers && context.is_email_content {
        Some(extract_headers(doc)).filter(|headers| !headers.is_empty())
    } else {
        None
    };

    let images = doc
        .elements_by_tag("img")
        .iter()
        .filter_map(|img| {
            let src = clean_attribute(img.attr("src"));
            if src.is_empty() {
                return None;
            }
            Some(ImageInfo {
                alt: clean_attribute(img.attr("alt")),
                title: non_empty(img.attr("title")),
                is_inline: is_inline_image(img),
                src,
            })
        })
        .collect();

    let links = doc
        .elements_by_tag("a")
        .iter()
        .filter_map(|a| {
            let href = clean_attribute(a.attr("href"));
            if href.is_empty() {
                return None;
            }
            Some(LinkInfo {
                text: collapse_whitespace(a.text_content()).trim().to_string(),
                title: non_empty(a.attr("title")),
                is_email: href.to_lowercase().starts_with("mailto:"),
                href,
            })
        })
        .collect();

    DocumentMetadata {
        title: doc.title(),
        email_headers,
        images,
        links,
    }
}
