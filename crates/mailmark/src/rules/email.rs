//! Mail-client rules, consulted only when a document looks like an email.
//!
//! These rules are self-contained: `blockquote` and `pre` repeat the base
//! behavior so the email table can be swapped without touching the base one.

use mailmark_core::{ConversionOptions, TableHandling};

use super::common::{block, block_quote, code_block, link, quote_lines};
use super::{Rule, RuleSet};
use crate::node::NodeRef;
use crate::table;
use crate::utilities::class_and_id;

/// Class/id markers of signature blocks
const SIGNATURE_MARKERS: &[&str] = &["signature", "sig", "footer"];

/// Body text phrases of signature blocks
const SIGNATURE_PHRASES: &[&str] = &["sent from", "regards", "sincerely"];

/// Class markers of quoted replies
const QUOTE_CLASSES: &[&str] = &["quoted", "gmail_quote", "yahoo_quoted"];

/// Colors treated as "important" and rendered highlighted
const IMPORTANT_COLORS: &[&str] = &[
    "red",
    "#ff0000",
    "#f00",
    "#cc0000",
    "#c00",
    "#e00",
    "#ee0000",
    "crimson",
    "#dc143c",
    "darkred",
    "#8b0000",
    "firebrick",
    "#b22222",
    "rgb(255,0,0)",
    "rgb(204,0,0)",
];

/// Create the email rule table
pub fn email_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert("emailDiv", div_rule());
    rules.insert("emailTable", table_rule());
    rules.insert("inlineStyle", inline_style_rule());
    rules.insert("emailLink", link_rule());
    rules.insert("emailBlockquote", blockquote_rule());
    rules.insert("emailPre", pre_rule());
    rules
}

fn div_rule() -> Rule {
    Rule::for_tag("div", |node, content, options| {
        if is_signature(node) {
            if !options.handle_email_signatures {
                return Ok(String::new());
            }
            let content = content.trim();
            if content.is_empty() {
                return Ok(String::new());
            }
            return Ok(format!("\n\n---\n\n{content}\n\n"));
        }

        if is_quoted(node) {
            if !options.preserve_email_quotes {
                return Ok(String::new());
            }
            return Ok(quote_lines(content));
        }

        if is_outlook_wrapper(node) {
            return Ok(content.to_string());
        }

        Ok(block(content))
    })
}

/// Signature blocks by class/id substring or by closing phrase in the text
fn is_signature(node: &NodeRef) -> bool {
    let markers = class_and_id(node.attr("class"), node.attr("id"));
    if SIGNATURE_MARKERS.iter().any(|marker| markers.contains(marker)) {
        return true;
    }
    let text = node.text_content().to_lowercase();
    SIGNATURE_PHRASES.iter().any(|phrase| text.contains(phrase))
}

/// Quoted replies by class marker, a left border, or `dir="ltr"`
fn is_quoted(node: &NodeRef) -> bool {
    let class = node.attr("class").unwrap_or("").to_lowercase();
    QUOTE_CLASSES.iter().any(|marker| class.contains(marker))
        || node
            .attr("style")
            .is_some_and(|style| style.to_lowercase().contains("border-left"))
        || node.attr("dir").is_some_and(|dir| dir.trim().eq_ignore_ascii_case("ltr"))
}

fn is_outlook_wrapper(node: &NodeRef) -> bool {
    let class = node.attr("class").unwrap_or("").to_lowercase();
    class.contains("wordsection")
        || class.contains("msonormal")
        || node
            .attr("style")
            .is_some_and(|style| style.to_lowercase().contains("mso-"))
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |node, content, options| {
        if table::is_layout_table(node) {
            return Ok(content.to_string());
        }
        match options.table_handling {
            TableHandling::Remove => Ok(String::new()),
            TableHandling::Convert | TableHandling::Preserve => Ok(table::render(node, options)),
        }
    })
}

fn inline_style_rule() -> Rule {
    Rule::for_tags(&["span", "font"], |node, content, options| {
        if !options.convert_inline_styles {
            return Ok(content.to_string());
        }
        Ok(InlineStyle::of(node).apply(content, options))
    })
}

fn link_rule() -> Rule {
    Rule::for_tag("a", |node, content, options| {
        let is_phone = node
            .attr("href")
            .is_some_and(|href| href.trim().to_lowercase().starts_with("tel:"));
        if is_phone {
            return Ok(content.to_string());
        }
        Ok(link(node, content, options))
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |node, content, options| {
        if !options.preserve_email_quotes && has_quote_marker(node) {
            return Ok(String::new());
        }
        Ok(block_quote(node, content))
    })
}

fn has_quote_marker(node: &NodeRef) -> bool {
    let class = node.attr("class").unwrap_or("").to_lowercase();
    node.attr("type").is_some_and(|t| t.eq_ignore_ascii_case("cite"))
        || class.contains("gmail_quote")
        || class.contains("yahoo_quoted")
}

fn pre_rule() -> Rule {
    Rule::for_tag("pre", |node, _, options| Ok(code_block(node, options)))
}

/// Formatting read from a `style` attribute and `<font color>`
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct InlineStyle {
    bold: bool,
    italic: bool,
    underline: bool,
    highlight: bool,
}

impl InlineStyle {
    fn of(node: &NodeRef) -> Self {
        let mut style = Self::default();

        for declaration in node.attr("style").unwrap_or("").split(';') {
            let Some((property, value)) = declaration.split_once(':') else {
                continue;
            };
            let property = property.trim().to_lowercase();
            let value = value.trim().to_lowercase();
            match property.as_str() {
                "font-weight" => style.bold |= is_bold_weight(&value),
                "font-style" => style.italic |= value == "italic" || value == "oblique",
                "text-decoration" | "text-decoration-line" => {
                    style.underline |= value.contains("underline")
                }
                "color" => style.highlight |= is_important_color(&value),
                _ => {}
            }
        }

        if node.tag_name() == "font" {
            if let Some(color) = node.attr("color") {
                style.highlight |= is_important_color(color);
            }
        }

        style
    }

    /// Wrap content innermost-first: underline, italic, bold, highlight.
    /// Surrounding whitespace stays outside the markers.
    fn apply(self, content: &str, options: &ConversionOptions) -> String {
        let inner = content.trim();
        if inner.is_empty() || self == Self::default() {
            return content.to_string();
        }

        let mut text = inner.to_string();
        if self.underline {
            text = format!("<u>{text}</u>");
        }
        if self.italic {
            text = format!("{0}{text}{0}", options.em_delimiter);
        }
        if self.bold {
            text = format!("{0}{text}{0}", options.strong_delimiter);
        }
        if self.highlight {
            text = format!("<mark>{text}</mark>");
        }

        let leading = &content[..content.len() - content.trim_start().len()];
        let trailing = &content[content.trim_end().len()..];
        format!("{leading}{text}{trailing}")
    }
}

fn is_bold_weight(value: &str) -> bool {
    match value {
        "bold" | "bolder" => true,
        _ => value.parse::<u32>().is_ok_and(|weight| weight >= 600),
    }
}

fn is_important_color(value: &str) -> bool {
    let normalized: String = value
        .trim_end_matches("!important")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    IMPORTANT_COLORS.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Document;

    fn apply_with(node: &NodeRef, content: &str, options: &ConversionOptions) -> String {
        email_rules()
            .get_rule(node.tag_name())
            .unwrap()
            .replace(node, content, options)
            .unwrap()
    }

    fn apply(node: &NodeRef, content: &str) -> String {
        apply_with(node, content, &ConversionOptions::default())
    }

    #[test]
    fn test_signature_by_class() {
        let doc = Document::with_root_attrs("div", vec![("class", "signature")]);
        assert_eq!(apply(&doc.root(), "Best regards, A"), "\n\n---\n\nBest regards, A\n\n");

        let options = ConversionOptions {
            handle_email_signatures: false,
            ..Default::default()
        };
        assert_eq!(apply_with(&doc.root(), "Best regards, A", &options), "");
    }

    #[test]
    fn test_signature_markers_match_inside_names() {
        let by_id = Document::with_root_attrs("div", vec![("id", "sigBlock")]);
        assert!(is_signature(&by_id.root()));

        let footer = Document::with_root_attrs("div", vec![("class", "mail-footer")]);
        assert!(is_signature(&footer.root()));

        let plain = Document::with_root_attrs("div", vec![("class", "content")]);
        assert!(!is_signature(&plain.root()));
    }

    #[test]
    fn test_signature_phrase_anywhere_in_text() {
        let mut doc = Document::new("div");
        let root = doc.root_id();
        doc.append_text(root, "Sincerely, Bob");
        assert!(is_signature(&doc.root()));

        let mut wrapper = Document::new("div");
        let root = wrapper.root_id();
        let p = wrapper.append_element(root, "p", Vec::new());
        wrapper.append_text(p, "Best regards,");
        let p = wrapper.append_element(root, "p", Vec::new());
        wrapper.append_text(p, "Ann");
        assert!(is_signature(&wrapper.root()));

        let options = ConversionOptions {
            handle_email_signatures: false,
            ..Default::default()
        };
        assert_eq!(apply_with(&wrapper.root(), "Best regards,\n\nAnn", &options), "");
    }

    #[test]
    fn test_quoted_div() {
        let doc = Document::with_root_attrs("div", vec![("class", "gmail_quote")]);
        assert_eq!(apply(&doc.root(), "On Monday\n\nHi"), "\n> On Monday\n>\n> Hi\n\n");

        let options = ConversionOptions {
            preserve_email_quotes: false,
            ..Default::default()
        };
        assert_eq!(apply_with(&doc.root(), "Hi", &options), "");
    }

    #[test]
    fn test_ltr_div_is_quoted() {
        let mut doc = Document::with_root_attrs("div", vec![("dir", "ltr")]);
        let root = doc.root_id();
        doc.append_text(root, "older text");
        assert!(is_quoted(&doc.root()));
        assert_eq!(apply(&doc.root(), "older text"), "\n> older text\n\n");

        let options = ConversionOptions {
            preserve_email_quotes: false,
            ..Default::default()
        };
        assert_eq!(apply_with(&doc.root(), "older text", &options), "");

        let rtl = Document::with_root_attrs("div", vec![("dir", "rtl")]);
        assert!(!is_quoted(&rtl.root()));
    }

    #[test]
    fn test_border_left_div_is_quoted() {
        let doc = Document::with_root_attrs(
            "div",
            vec![("style", "border-left:1px solid #ccc;padding-left:1ex")],
        );
        assert!(is_quoted(&doc.root()));
    }

    #[test]
    fn test_outlook_wrapper_passes_through() {
        let doc = Document::with_root_attrs("div", vec![("class", "WordSection1")]);
        assert_eq!(apply(&doc.root(), "x\n"), "x\n");
    }

    #[test]
    fn test_tel_link() {
        let doc = Document::with_root_attrs("a", vec![("href", "tel:+123")]);
        assert_eq!(apply(&doc.root(), "+123"), "+123");
    }

    #[test]
    fn test_inline_styles() {
        let doc = Document::with_root_attrs(
            "span",
            vec![("style", "font-weight: 700; font-style: italic; text-decoration: underline")],
        );
        assert_eq!(apply(&doc.root(), " hi "), " ***<u>hi</u>*** ");

        let red = Document::with_root_attrs("font", vec![("color", "#FF0000")]);
        assert_eq!(apply(&red.root(), "alert"), "<mark>alert</mark>");

        let plain = Document::with_root_attrs("span", vec![("style", "color: blue")]);
        assert_eq!(apply(&plain.root(), "x"), "x");
    }

    #[test]
    fn test_inline_styles_disabled() {
        let doc = Document::with_root_attrs("span", vec![("style", "font-weight: bold")]);
        let options = ConversionOptions {
            convert_inline_styles: false,
            ..Default::default()
        };
        assert_eq!(apply_with(&doc.root(), "x", &options), "x");
    }

    #[test]
    fn test_important_colors() {
        assert!(is_important_color("RGB(255, 0, 0)"));
        assert!(is_important_color("red !important"));
        assert!(!is_important_color("#00ff00"));
    }

    #[test]
    fn test_cite_blockquote_dropped_when_quotes_off() {
        let doc = Document::with_root_attrs("blockquote", vec![("type", "cite")]);
        let options = ConversionOptions {
            preserve_email_quotes: false,
            ..Default::default()
        };
        assert_eq!(apply_with(&doc.root(), "x", &options), "");
        assert_eq!(apply(&doc.root(), "x"), "\n> x\n\n");
    }
}
