//! Generic HTML rules for HTML to Markdown conversion.

use mailmark_core::{ConversionOptions, TableHandling};

use super::common::{
    block, block_quote, code_block, code_span, image, link, list_item_body, separated_block,
    wrap_inline,
};
use super::{Filter, Rule, RuleSet};
use crate::node::NodeRef;
use crate::table;

/// Tags rendered like `div`
const CONTAINER_TAGS: &[&str] = &[
    "div", "section", "article", "header", "footer", "main", "aside", "nav", "figure",
    "figcaption", "address",
];

/// Create the base rule table
pub fn base_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    rules.insert("heading", heading_rule());
    rules.insert("paragraph", paragraph_rule());
    rules.insert("lineBreak", line_break_rule());
    rules.insert("horizontalRule", horizontal_rule());
    rules.insert("strong", strong_rule());
    rules.insert("emphasis", emphasis_rule());
    rules.insert("code", code_rule());
    rules.insert("codeBlock", code_block_rule());
    rules.insert("link", link_rule());
    rules.insert("image", image_rule());
    rules.insert("list", list_rule());
    rules.insert("listItem", list_item_rule());
    rules.insert("blockquote", blockquote_rule());
    rules.insert("table", table_rule());
    rules.insert("tableRow", table_row_rule());
    rules.insert("tableCell", table_cell_rule());
    rules.insert("container", container_rule());
    rules.insert("strikethrough", strikethrough_rule());
    for tag in ["u", "small", "sub", "sup", "ins", "mark"] {
        rules.insert(tag, html_wrapper_rule(tag));
    }
    rules
}

fn heading_rule() -> Rule {
    Rule::new(
        Filter::tags(&["h1", "h2", "h3", "h4", "h5", "h6"]),
        |node, content, _| {
            let level: usize = node.tag_name()[1..].parse().unwrap_or(1);
            let content = content.trim().replace('\n', " ");
            if content.is_empty() {
                return Ok(String::new());
            }
            Ok(format!("\n{} {}\n\n", "#".repeat(level), content))
        },
    )
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| Ok(separated_block(content)))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, _| Ok("\n".to_string()))
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, _| Ok("\n---\n\n".to_string()))
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, options| {
        let delimiter = &options.strong_delimiter;
        Ok(wrap_inline(content, delimiter, delimiter))
    })
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, options| {
        let delimiter = &options.em_delimiter;
        Ok(wrap_inline(content, delimiter, delimiter))
    })
}

fn code_rule() -> Rule {
    Rule::for_tag("code", |node, content, _| {
        // The enclosing <pre> fences the block
        if node.has_ancestor("pre") {
            return Ok(content.to_string());
        }
        Ok(code_span(node.text_content()))
    })
}

fn code_block_rule() -> Rule {
    Rule::for_tag("pre", |node, _, options| Ok(code_block(node, options)))
}

fn link_rule() -> Rule {
    Rule::for_tag("a", |node, content, options| Ok(link(node, content, options)))
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| Ok(image(node)))
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |_, content, _| Ok(separated_block(content)))
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, options| {
        Ok(format!(
            "{} {}\n",
            list_marker(node, options),
            list_item_body(content)
        ))
    })
}

/// `N.` inside an ordered list (honoring `start`), the bullet otherwise
fn list_marker(node: &NodeRef, options: &ConversionOptions) -> String {
    match node.parent().filter(|p| p.tag_name() == "ol") {
        Some(list) => {
            let start: usize = list
                .attr("start")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(1);
            let offset = node.element_index().saturating_sub(1);
            format!("{}.", start.saturating_add(offset))
        }
        None => options.bullet_list_marker.to_string(),
    }
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |node, content, _| Ok(block_quote(node, content)))
}

fn table_rule() -> Rule {
    Rule::for_tag("table", |node, content, options| {
        if options.table_handling == TableHandling::Remove {
            return Ok(String::new());
        }
        if table::is_layout_table(node) {
            return Ok(separated_block(content));
        }
        Ok(table::render(node, options))
    })
}

fn table_row_rule() -> Rule {
    Rule::for_tag("tr", |_, content, _| Ok(block(content)))
}

fn table_cell_rule() -> Rule {
    Rule::for_tags(&["td", "th"], |_, content, _| {
        let content = content.trim();
        if content.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{content} "))
    })
}

fn container_rule() -> Rule {
    Rule::for_tags(CONTAINER_TAGS, |_, content, _| Ok(block(content)))
}

fn strikethrough_rule() -> Rule {
    Rule::for_tags(&["del", "s", "strike"], |_, content, _| {
        Ok(wrap_inline(content, "~~", "~~"))
    })
}

/// Keep the tag as inline HTML around its content
fn html_wrapper_rule(tag: &'static str) -> Rule {
    Rule::for_tag(tag, move |_, content, _| {
        Ok(wrap_inline(content, &format!("<{tag}>"), &format!("</{tag}>")))
    })
}
