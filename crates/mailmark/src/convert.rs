//! Depth-first tree conversion with rule dispatch.

use std::collections::{HashMap, HashSet};

use mailmark_core::{collapse_whitespace, escape_markdown, ConversionOptions};

use crate::node::{NodeData, NodeId, NodeRef};
use crate::rules::{RuleHandle, Rules};
use crate::utilities::{is_block, is_ignored, is_inline};
use crate::{MailmarkError, Result};

/// Deepest element nesting the converter descends into
pub const MAX_DEPTH: usize = 512;

/// Per-call conversion state.
///
/// Holds the visited set and the tag-to-rule cache for a single document;
/// both go away with the converter, so nothing leaks between calls.
pub(crate) struct TreeConverter<'r> {
    rules: &'r Rules,
    options: &'r ConversionOptions,
    email_mode: bool,
    visited: HashSet<NodeId>,
    rule_cache: HashMap<String, Option<RuleHandle>>,
}

impl<'r> TreeConverter<'r> {
    pub fn new(rules: &'r Rules, options: &'r ConversionOptions, email_mode: bool) -> Self {
        Self {
            rules,
            options,
            email_mode,
            visited: HashSet::new(),
            rule_cache: HashMap::new(),
        }
    }

    /// Convert a node and its subtree to Markdown
    pub fn convert(&mut self, node: NodeRef<'_>) -> Result<String> {
        self.convert_node(node, 0)
    }

    fn convert_node(&mut self, node: NodeRef<'_>, depth: usize) -> Result<String> {
        if !self.visited.insert(node.id()) {
            return Ok(String::new());
        }

        match node.data() {
            NodeData::Text(text) => Ok(self.convert_text(node, text)),
            NodeData::Comment(_) => Ok(String::new()),
            NodeData::Element { name, .. } => {
                if is_ignored(name) {
                    return Ok(String::new());
                }
                if depth >= MAX_DEPTH {
                    return Err(MailmarkError::DepthExceeded(MAX_DEPTH));
                }
                let content = self.convert_children(node, depth)?;
                Ok(self.apply_rule(node, name, content))
            }
        }
    }

    fn convert_text(&self, node: NodeRef<'_>, text: &str) -> String {
        if self.options.preserve_whitespace {
            return text.to_string();
        }

        let mut text = collapse_whitespace(text);
        let in_block = node.parent().is_some_and(|p| is_block(p.tag_name()));
        if in_block {
            if at_block_edge(node.prev_sibling()) {
                text = text.trim_start().to_string();
            }
            if at_block_edge(node.next_sibling()) {
                text = text.trim_end().to_string();
            }
        }
        escape_markdown(&text)
    }

    fn convert_children(&mut self, node: NodeRef<'_>, depth: usize) -> Result<String> {
        let mut output = String::new();
        let mut previous_inline = false;

        for child in node.children() {
            if self.visited.contains(&child.id()) {
                continue;
            }
            let rendered = self.convert_node(child, depth + 1)?;
            if rendered.is_empty() {
                continue;
            }

            let inline = child.is_element() && is_inline(child.tag_name());
            if inline
                && previous_inline
                && !self.options.preserve_whitespace
                && !output.ends_with(char::is_whitespace)
                && !rendered.starts_with(char::is_whitespace)
            {
                output.push(' ');
            }

            output.push_str(&rendered);
            previous_inline = inline;
        }

        Ok(output)
    }

    fn resolve(&mut self, tag: &str) -> Option<RuleHandle> {
        if let Some(handle) = self.rule_cache.get(tag) {
            return *handle;
        }
        let handle = self.rules.resolve(tag, self.email_mode);
        self.rule_cache.insert(tag.to_string(), handle);
        handle
    }

    /// Run the rule for an element; unknown tags and failing rules keep the
    /// child content.
    fn apply_rule(&mut self, node: NodeRef<'_>, tag: &str, content: String) -> String {
        let rules = self.rules;
        let Some(rule) = self.resolve(tag).and_then(|handle| rules.get(handle)) else {
            return content;
        };

        tracing::trace!(tag, "applying rule");
        match rule.replace(&node, &content, self.options) {
            Ok(markdown) => markdown,
            Err(err) => {
                let err = MailmarkError::RuleError {
                    tag: tag.to_string(),
                    message: err.to_string(),
                };
                tracing::warn!(error = %err, "rule failed, keeping child content");
                content
            }
        }
    }
}

/// No sibling, or a block sibling, on this side of a text node
fn at_block_edge(sibling: Option<NodeRef<'_>>) -> bool {
    sibling.map_or(true, |s| is_block(s.tag_name()))
}
