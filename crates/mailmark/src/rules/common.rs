//! Formatting helpers shared by the base and email rule tables.

use mailmark_core::{collapse_blank_lines, CodeBlockStyle, ConversionOptions, LinkStyle};

use crate::node::NodeRef;
use crate::utilities::clean_attribute;

/// Wrap trimmed content in delimiters; empty content is dropped
pub(crate) fn wrap_inline(content: &str, open: &str, close: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{open}{trimmed}{close}")
}

/// Trimmed content on its own line; empty content is dropped
pub(crate) fn block(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{trimmed}\n")
}

/// Trimmed content surrounded by blank lines; empty content is dropped
pub(crate) fn separated_block(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("\n{trimmed}\n\n")
}

/// Prefix every line with `>` repeated once per blockquote nesting level.
///
/// Lines that already start with `>` come from a nested quote rendered at a
/// deeper level and are kept as they are.
pub(crate) fn block_quote(node: &NodeRef, content: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        return String::new();
    }

    let depth = 1 + node
        .ancestors()
        .filter(|a| a.tag_name() == "blockquote")
        .count();
    let prefix = ">".repeat(depth);

    let quoted: Vec<String> = content
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                prefix.clone()
            } else if line.starts_with('>') {
                line.to_string()
            } else {
                format!("{prefix} {line}")
            }
        })
        .collect();

    format!("\n{}\n\n", quoted.join("\n"))
}

/// Quote every line with a single `> `, nesting any existing quote markers
pub(crate) fn quote_lines(content: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        return String::new();
    }

    let quoted: Vec<String> = content
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect();

    format!("\n{}\n\n", quoted.join("\n"))
}

/// Render a `<pre>` element as a fenced or indented code block
pub(crate) fn code_block(node: &NodeRef, options: &ConversionOptions) -> String {
    let code = node.text_content().trim_end_matches(['\n', '\r']);
    if code.trim().is_empty() {
        return String::new();
    }

    match options.code_block_style {
        CodeBlockStyle::Fenced => {
            let language = node
                .find_descendant("code")
                .and_then(|c| c.attr("class"))
                .and_then(|class| {
                    class
                        .split_whitespace()
                        .find_map(|c| c.strip_prefix("language-"))
                })
                .unwrap_or("");
            let fence = &options.fence;
            format!("\n{fence}{language}\n{code}\n{fence}\n\n")
        }
        CodeBlockStyle::Indented => {
            let indented: Vec<String> = code.lines().map(|line| format!("    {line}")).collect();
            format!("\n{}\n\n", indented.join("\n"))
        }
    }
}

/// Render inline code, widening the backtick run when the code has one
pub(crate) fn code_span(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }
    let backticks = if code.contains('`') { "``" } else { "`" };
    let space = if code.starts_with('`') || code.ends_with('`') {
        " "
    } else {
        ""
    };
    format!("{backticks}{space}{code}{space}{backticks}")
}

/// Render an anchor.
///
/// `mailto:` links whose text is the address become autolinks; other links
/// with a target become `[text](href "title")`. With the plain link style,
/// or without a target, only the text remains.
pub(crate) fn link(node: &NodeRef, content: &str, options: &ConversionOptions) -> String {
    let href = clean_attribute(node.attr("href"));
    if href.is_empty() || options.link_style == LinkStyle::Plain {
        return content.to_string();
    }

    let text = content.trim();
    if let Some(address) = href.strip_prefix("mailto:") {
        let address = address.split('?').next().unwrap_or(address);
        if node.text_content().trim() == address {
            return format!("<{address}>");
        }
    }

    let target = if href.contains(char::is_whitespace) {
        format!("<{href}>")
    } else {
        href
    };
    format!("[{text}]({target}{})", title_part(node))
}

/// Render an image; images without a source are dropped
pub(crate) fn image(node: &NodeRef) -> String {
    let src = clean_attribute(node.attr("src"));
    if src.is_empty() {
        return String::new();
    }
    let alt = clean_attribute(node.attr("alt"));
    format!("![{alt}]({src}{})", title_part(node))
}

fn title_part(node: &NodeRef) -> String {
    let title = clean_attribute(node.attr("title"));
    if title.is_empty() {
        return String::new();
    }
    format!(" \"{}\"", title.replace('"', "\\\""))
}

/// Indent list item continuation lines under the marker
pub(crate) fn list_item_body(content: &str) -> String {
    collapse_blank_lines(content.trim()).replace('\n', "\n    ")
}
