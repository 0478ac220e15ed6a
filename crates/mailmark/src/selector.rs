//! Simple CSS-like selectors for element lookups.
//!
//! Supported forms: `tag`, `*`, `[attr]`, `[attr="v"]`, `[attr*="v"]`, and a
//! tag followed by one attribute predicate (`blockquote[type="cite"]`).
//! Tag names match case-insensitively, attribute values case-sensitively.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::node::NodeRef;
use crate::{MailmarkError, Result};

static SELECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^\s*([A-Za-z][A-Za-z0-9]*|\*)?(?:\[\s*([A-Za-z_:][-A-Za-z0-9_:.]*)\s*(?:(\*?=)\s*(?:"([^"]*)"|'([^']*)'|([^\]\s"']+))\s*)?\])?\s*$"#,
    )
    .unwrap()
});

/// Attribute predicate of a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    /// `[attr]`
    Exists(String),
    /// `[attr="value"]`
    Equals(String, String),
    /// `[attr*="value"]`
    Contains(String, String),
}

impl AttrMatch {
    fn matches(&self, node: &NodeRef) -> bool {
        match self {
            AttrMatch::Exists(name) => node.has_attr(name),
            AttrMatch::Equals(name, value) => node.attr(name) == Some(value.as_str()),
            AttrMatch::Contains(name, value) => {
                node.attr(name).is_some_and(|v| v.contains(value.as_str()))
            }
        }
    }
}

/// A parsed selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    attr: Option<AttrMatch>,
}

impl Selector {
    /// Parse a selector string
    pub fn parse(selector: &str) -> Result<Self> {
        let caps = SELECTOR_RE
            .captures(selector)
            .ok_or_else(|| MailmarkError::SelectorError(selector.to_string()))?;

        let tag = caps.get(1).map(|m| m.as_str());
        let attr_name = caps.get(2).map(|m| m.as_str().to_lowercase());
        if tag.is_none() && attr_name.is_none() {
            return Err(MailmarkError::SelectorError(selector.to_string()));
        }

        let value = caps
            .get(4)
            .or_else(|| caps.get(5))
            .or_else(|| caps.get(6))
            .map(|m| m.as_str().to_string());

        let attr = attr_name.map(|name| match (caps.get(3).map(|m| m.as_str()), value) {
            (Some("*="), Some(value)) => AttrMatch::Contains(name, value),
            (Some(_), Some(value)) => AttrMatch::Equals(name, value),
            _ => AttrMatch::Exists(name),
        });

        Ok(Self {
            tag: tag.filter(|t| *t != "*").map(str::to_lowercase),
            attr,
        })
    }

    /// Match elements by tag name
    pub fn tag(name: &str) -> Self {
        Self {
            tag: Some(name.to_lowercase()),
            attr: None,
        }
    }

    /// Match elements whose attribute contains a substring
    pub fn attr_contains(name: &str, value: &str) -> Self {
        Self {
            tag: None,
            attr: Some(AttrMatch::Contains(name.to_lowercase(), value.to_string())),
        }
    }

    /// Check whether an element matches
    pub fn matches(&self, node: &NodeRef) -> bool {
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if node.tag_name() != tag {
                return false;
            }
        }
        self.attr.as_ref().map_or(true, |attr| attr.matches(node))
    }
}

impl FromStr for Selector {
    type Err = MailmarkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse a fixed list of selectors, skipping any that do not parse
pub(crate) fn selector_list(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}
