//! Email heuristics: context detection, header extraction, and Outlook cleanup.
//!
//! Everything here is best-effort classification by fixed marker lists and
//! patterns. The lists are part of the observable behavior, so extend them
//! rather than rewriting the matching.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::node::{Document, NodeRef};
use crate::selector::{selector_list, Selector};
use crate::utilities::class_and_id;

/// Mail client that produced a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    Gmail,
    Outlook,
    Yahoo,
    Apple,
    Thunderbird,
    #[default]
    Other,
}

/// Detected email shape of a document, computed once per conversion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailContext {
    pub is_email_content: bool,
    pub has_email_headers: bool,
    pub has_signature: bool,
    pub has_quoted_content: bool,
    pub client_type: ClientType,
}

/// Header fields found in an email body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailHeaders {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl EmailHeaders {
    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_empty()
            && self.cc.is_empty()
            && self.bcc.is_empty()
            && self.subject.is_none()
            && self.date.is_none()
    }
}

static EMAIL_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selector_list(&[
        r#"[class*="gmail"]"#,
        r#"[class*="outlook"]"#,
        r#"[class*="Mso"]"#,
        r#"[style*="mso-"]"#,
        r#"[class*="yahoo"]"#,
        r#"[class*="signature"]"#,
        r#"[id*="signature"]"#,
        r#"[id*="Signature"]"#,
        r#"[class*="quoted"]"#,
        r#"[class*="email"]"#,
        r#"blockquote[type="cite"]"#,
    ])
});

const EMAIL_PHRASES: &[&str] = &[
    "from:",
    "subject:",
    "sent from",
    "best regards",
    "kind regards",
    "sincerely",
    "original message",
    "forwarded message",
];

static HEADER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selector_list(&[
        r#"[class*="email-header"]"#,
        r#"[class*="sender"]"#,
        r#"[class*="subject"]"#,
        r#"[id*="sender"]"#,
        r#"[id*="subject"]"#,
        r#"[id*="divRplyFwdMsg"]"#,
    ])
});

static SIGNATURE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selector_list(&[
        r#"[class*="signature"]"#,
        r#"[id*="signature"]"#,
        r#"[id*="Signature"]"#,
        r#"[class*="moz-signature"]"#,
    ])
});

static QUOTE_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    selector_list(&[
        r#"blockquote[type="cite"]"#,
        r#"[class*="gmail_quote"]"#,
        r#"[class*="yahoo_quoted"]"#,
        r#"[class*="quoted"]"#,
        r#"[class*="moz-cite-prefix"]"#,
    ])
});

/// Client markers in detection priority order
static CLIENT_SELECTORS: Lazy<Vec<(ClientType, Vec<Selector>)>> = Lazy::new(|| {
    vec![
        (ClientType::Gmail, selector_list(&[r#"[class*="gmail"]"#])),
        (
            ClientType::Outlook,
            selector_list(&[
                r#"[class*="Mso"]"#,
                r#"[class*="WordSection"]"#,
                r#"[class*="outlook"]"#,
                r#"[id*="divRplyFwdMsg"]"#,
            ]),
        ),
        (
            ClientType::Yahoo,
            selector_list(&[r#"[class*="yahoo"]"#, r#"[class*="ydp"]"#]),
        ),
        (
            ClientType::Apple,
            selector_list(&[
                r#"[class*="Apple-"]"#,
                r#"[class*="apple-mail"]"#,
                r#"[id*="AppleMailSignature"]"#,
            ]),
        ),
        (
            ClientType::Thunderbird,
            selector_list(&[r#"[class*="moz-"]"#]),
        ),
    ]
});

static HEADER_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(from|to|cc|subject|date|sent)\s*:\s*\S").unwrap());

static SIGNATURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)(best regards,|kind regards,|sincerely,|^\s*sent from my \S+|^\s*--\s*$)")
        .unwrap()
});

static QUOTED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?im)(^\s*>|wrote:\s*$)").unwrap());

static HEADER_FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(from|to|cc|bcc|subject|date|sent)\s*:[ \t]*(.*?)\s*$").unwrap()
});

static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(from|to|cc|bcc|subject|date|sent|sender|recipients?)\s*:\s*").unwrap()
});

fn any_match(doc: &Document, selectors: &[Selector]) -> bool {
    selectors.iter().any(|s| doc.query_selector(s).is_some())
}

/// Classify a parsed document
pub fn detect_context(doc: &Document) -> EmailContext {
    let text = doc.body().inner_text();
    let lowered = text.to_lowercase();

    let is_email_content = any_match(doc, &EMAIL_SELECTORS)
        || EMAIL_PHRASES.iter().any(|phrase| lowered.contains(phrase));

    let context = EmailContext {
        is_email_content,
        has_email_headers: any_match(doc, &HEADER_SELECTORS) || HEADER_LINE_RE.is_match(&text),
        has_signature: any_match(doc, &SIGNATURE_SELECTORS) || SIGNATURE_RE.is_match(&text),
        has_quoted_content: any_match(doc, &QUOTE_SELECTORS) || QUOTED_RE.is_match(&text),
        client_type: detect_client(doc),
    };
    tracing::debug!(?context, "detected email context");
    context
}

fn detect_client(doc: &Document) -> ClientType {
    for (client, selectors) in CLIENT_SELECTORS.iter() {
        if any_match(doc, selectors) {
            return *client;
        }
    }

    let generator = doc
        .elements_by_tag("meta")
        .into_iter()
        .find(|meta| {
            meta.attr("name")
                .is_some_and(|name| name.eq_ignore_ascii_case("generator"))
        })
        .and_then(|meta| meta.attr("content"))
        .map(str::to_lowercase);

    match generator.as_deref() {
        Some(g) if g.contains("gmail") => ClientType::Gmail,
        Some(g) if g.contains("microsoft") || g.contains("outlook") => ClientType::Outlook,
        Some(g) if g.contains("yahoo") => ClientType::Yahoo,
        Some(g) if g.contains("apple") => ClientType::Apple,
        Some(g) if g.contains("thunderbird") || g.contains("mozilla") => ClientType::Thunderbird,
        _ => ClientType::Other,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    From,
    To,
    Cc,
    Bcc,
    Subject,
    Date,
}

/// Class/id keys per field, synonyms included
const FIELD_KEYS: &[(Field, &[&str])] = &[
    (Field::From, &["from", "sender"]),
    (Field::Subject, &["subject"]),
    (Field::Date, &["date", "sent"]),
    (Field::To, &["to", "recipient"]),
    (Field::Cc, &["cc"]),
    (Field::Bcc, &["bcc"]),
];

/// Pull From/To/Cc/Bcc/Subject/Date out of markup or body text
pub fn extract_headers(doc: &Document) -> EmailHeaders {
    let mut headers = EmailHeaders::default();
    let elements = doc.elements();

    for (field, keys) in FIELD_KEYS {
        let value = elements
            .iter()
            .filter(|el| {
                let markers = class_and_id(el.attr("class"), el.attr("id"));
                keys.iter().any(|key| markers.contains(key))
            })
            .map(|el| strip_label(el))
            .find(|value| !value.is_empty());
        if let Some(value) = value {
            set_field(&mut headers, *field, &value);
        }
    }

    if headers.from.is_none() && headers.subject.is_none() {
        fill_from_text(&mut headers, &doc.body().inner_text());
    }

    headers
}

fn strip_label(el: &NodeRef) -> String {
    let text = el.inner_text().replace('\n', " ");
    LABEL_RE.replace(text.trim(), "").trim().to_string()
}

fn fill_from_text(headers: &mut EmailHeaders, text: &str) {
    for caps in HEADER_FIELD_RE.captures_iter(text) {
        let field = match caps[1].to_lowercase().as_str() {
            "from" => Field::From,
            "to" => Field::To,
            "cc" => Field::Cc,
            "bcc" => Field::Bcc,
            "subject" => Field::Subject,
            _ => Field::Date,
        };
        let value = caps[2].trim();
        // First occurrence wins
        if value.is_empty() || is_set(headers, field) {
            continue;
        }
        set_field(headers, field, value);
    }
}

fn is_set(headers: &EmailHeaders, field: Field) -> bool {
    match field {
        Field::From => headers.from.is_some(),
        Field::To => !headers.to.is_empty(),
        Field::Cc => !headers.cc.is_empty(),
        Field::Bcc => !headers.bcc.is_empty(),
        Field::Subject => headers.subject.is_some(),
        Field::Date => headers.date.is_some(),
    }
}

fn set_field(headers: &mut EmailHeaders, field: Field, value: &str) {
    match field {
        Field::From => headers.from = Some(value.to_string()),
        Field::Subject => headers.subject = Some(value.to_string()),
        Field::Date => headers.date = Some(value.to_string()),
        Field::To => headers.to = address_list(value),
        Field::Cc => headers.cc = address_list(value),
        Field::Bcc => headers.bcc = address_list(value),
    }
}

/// Split a recipient list into bare addresses
fn address_list(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(|part| {
            let part = part.trim();
            match (part.find('<'), part.rfind('>')) {
                (Some(start), Some(end)) if start < end => part[start + 1..end].trim(),
                _ => part.trim_matches(['<', '>']),
            }
        })
        .filter(|address| address.contains('@'))
        .map(str::to_string)
        .collect()
}

static XML_PROLOGUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<\?xml[^>]*\?>").unwrap());

static XMLNS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\s+xmlns(?::[\w-]+)?\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

static CONDITIONAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<!--\[if[^\]]*\]>.*?<!\[endif\]-->").unwrap());

static DOWNLEVEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<!\[if[^\]]*\]>|<!\[endif\]>").unwrap());

static OFFICE_P_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(/?)o:p\s*>").unwrap());

static STYLE_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bstyle\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());

static VENDOR_DECL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:mso-|-webkit-)[\w-]+\s*:[^;]*;?").unwrap());

static EMPTY_STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s+style\s*=\s*(?:"\s*"|'\s*')"#).unwrap());

static OFFICE_CLASS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\s+class\s*=\s*(?:"(?:MsoNormal|WordSection\d*)"|'(?:MsoNormal|WordSection\d*)'|(?:MsoNormal|WordSection\d*)\b)"#,
    )
    .unwrap()
});

/// Textual cleanup of Office-generated HTML, run before parsing
pub fn process_outlook_html(html: &str) -> String {
    let html = XML_PROLOGUE_RE.replace_all(html, "");
    let html = XMLNS_RE.replace_all(&html, "");
    let html = CONDITIONAL_RE.replace_all(&html, "");
    let html = DOWNLEVEL_RE.replace_all(&html, "");
    let html = OFFICE_P_RE.replace_all(&html, "<${1}p>");
    let html = STYLE_ATTR_RE.replace_all(&html, |caps: &Captures| {
        let style = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        let cleaned = VENDOR_DECL_RE.replace_all(style, "");
        format!("style=\"{}\"", cleaned.trim())
    });
    let html = EMPTY_STYLE_RE.replace_all(&html, "");
    OFFICE_CLASS_RE.replace_all(&html, "").into_owned()
}

/// Check whether an image is embedded in the message rather than linked
pub fn is_inline_image(img: &NodeRef) -> bool {
    let src = img.attr("src").unwrap_or("").trim();
    let lower = src.to_lowercase();
    lower.starts_with("cid:")
        || lower.starts_with("data:")
        || lower.starts_with("blob:")
        || src.contains("image001")
        || src.contains("image002")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_body(build: impl FnOnce(&mut Document, crate::node::NodeId)) -> Document {
        let mut doc = Document::new("html");
        let body = doc.append_element(doc.root_id(), "body", Vec::new());
        build(&mut doc, body);
        doc
    }

    #[test]
    fn test_plain_web_page_is_not_email() {
        let doc = doc_with_body(|doc, body| {
            let h1 = doc.append_element(body, "h1", Vec::new());
            doc.append_text(h1, "Welcome");
        });
        let context = detect_context(&doc);
        assert!(!context.is_email_content);
        assert_eq!(context.client_type, ClientType::Other);
    }

    #[test]
    fn test_gmail_quote_detection() {
        let doc = doc_with_body(|doc, body| {
            let quote = doc.append_element(body, "div", vec![("class", "gmail_quote")]);
            doc.append_text(quote, "On Mon, Ann wrote:");
        });
        let context = detect_context(&doc);
        assert!(context.is_email_content);
        assert!(context.has_quoted_content);
        assert_eq!(context.client_type, ClientType::Gmail);
    }

    #[test]
    fn test_signature_by_text() {
        let doc = doc_with_body(|doc, body| {
            let p = doc.append_element(body, "p", Vec::new());
            doc.append_text(p, "Thanks");
            let sig = doc.append_element(body, "p", Vec::new());
            doc.append_text(sig, "--");
        });
        let context = detect_context(&doc);
        assert!(context.has_signature);
        assert!(!context.is_email_content);
    }

    #[test]
    fn test_client_priority_and_generator() {
        let both = doc_with_body(|doc, body| {
            doc.append_element(body, "div", vec![("class", "moz-cite-prefix")]);
            doc.append_element(body, "p", vec![("class", "MsoNormal")]);
        });
        assert_eq!(detect_context(&both).client_type, ClientType::Outlook);

        let generator = doc_with_body(|doc, body| {
            doc.append_element(
                body,
                "meta",
                vec![("name", "Generator"), ("content", "Microsoft Word 15")],
            );
        });
        assert_eq!(detect_context(&generator).client_type, ClientType::Outlook);
    }

    #[test]
    fn test_headers_from_markup() {
        let doc = doc_with_body(|doc, body| {
            let from = doc.append_element(body, "div", vec![("class", "email-sender")]);
            doc.append_text(from, "From: Ann <ann@example.com>");
            let subject = doc.append_element(body, "div", vec![("id", "subject-line")]);
            doc.append_text(subject, "Lunch");
            let to = doc.append_element(body, "span", vec![("class", "hdr to")]);
            doc.append_text(to, "Bob <bob@example.com>; carol@example.com, nobody");
        });
        let headers = extract_headers(&doc);
        assert_eq!(headers.from.as_deref(), Some("Ann <ann@example.com>"));
        assert_eq!(headers.subject.as_deref(), Some("Lunch"));
        assert_eq!(headers.to, vec!["bob@example.com", "carol@example.com"]);
    }

    #[test]
    fn test_header_keys_match_inside_class_names() {
        let doc = doc_with_body(|doc, body| {
            let from = doc.append_element(body, "span", vec![("class", "msgFrom")]);
            doc.append_text(from, "ann@example.com");
            let subject = doc.append_element(body, "span", vec![("class", "msgSubject")]);
            doc.append_text(subject, "Lunch");
            let date = doc.append_element(body, "span", vec![("id", "sentAt")]);
            doc.append_text(date, "Sent: Monday");
        });
        let headers = extract_headers(&doc);
        assert_eq!(headers.from.as_deref(), Some("ann@example.com"));
        assert_eq!(headers.subject.as_deref(), Some("Lunch"));
        assert_eq!(headers.date.as_deref(), Some("Monday"));
    }

    #[test]
    fn test_headers_from_text() {
        let doc = doc_with_body(|doc, body| {
            for line in [
                "From: Ann <ann@example.com>",
                "Sent: Monday, May 1",
                "To: bob@example.com",
                "Subject: Plans",
                "From: Someone Else",
            ] {
                let p = doc.append_element(body, "p", Vec::new());
                doc.append_text(p, line);
            }
        });
        let headers = extract_headers(&doc);
        assert_eq!(headers.from.as_deref(), Some("Ann <ann@example.com>"));
        assert_eq!(headers.date.as_deref(), Some("Monday, May 1"));
        assert_eq!(headers.to, vec!["bob@example.com"]);
        assert_eq!(headers.subject.as_deref(), Some("Plans"));
        assert!(headers.cc.is_empty());
    }

    #[test]
    fn test_headers_empty() {
        let doc = doc_with_body(|doc, body| {
            doc.append_text(body, "nothing here");
        });
        assert!(extract_headers(&doc).is_empty());
    }

    #[test]
    fn test_process_outlook_html() {
        let html = concat!(
            r#"<?xml version="1.0"?><html xmlns:o="urn:schemas-microsoft-com:office:office">"#,
            r#"<!--[if gte mso 9]><xml><o:OfficeDocumentSettings/></xml><![endif]-->"#,
            r#"<div class=WordSection1><p class="MsoNormal" style="mso-line-height-alt:12pt;color:red">"#,
            r#"Hi<o:p></o:p></p><![if !supportLists]>x<![endif]>"#,
            r#"<span style="mso-bidi-font-weight:bold">y</span></div></html>"#,
        );
        let cleaned = process_outlook_html(html);
        assert_eq!(
            cleaned,
            concat!(
                "<html><div><p style=\"color:red\">Hi<p></p></p>x",
                "<span>y</span></div></html>"
            )
        );
    }

    #[test]
    fn test_inline_images() {
        let doc = doc_with_body(|doc, body| {
            doc.append_element(body, "img", vec![("src", "cid:image001.png@01D")]);
            doc.append_element(body, "img", vec![("src", "data:image/png;base64,xx")]);
            doc.append_element(body, "img", vec![("src", "https://example.com/a.png")]);
        });
        let flags: Vec<bool> = doc
            .elements_by_tag("img")
            .iter()
            .map(is_inline_image)
            .collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn test_context_serializes_camel_case() {
        let json = serde_json::to_value(EmailContext::default()).unwrap();
        assert_eq!(json["isEmailContent"], false);
        assert_eq!(json["clientType"], "other");
    }
}
