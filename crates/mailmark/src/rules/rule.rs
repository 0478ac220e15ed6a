//! Rule and Filter types for HTML conversion.

use indexmap::IndexMap;

use mailmark_core::ConversionOptions;

use crate::node::NodeRef;
use crate::Result;

/// Type alias for replacement functions
pub type ReplacementFn =
    Box<dyn Fn(&NodeRef<'_>, &str, &ConversionOptions) -> Result<String> + Send + Sync>;

/// A filter determines which elements a rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Match a single tag name
    TagName(String),
    /// Match any of multiple tag names
    TagNames(Vec<String>),
    /// Match every element (`*`)
    Any,
}

impl Filter {
    /// Create a filter for a single tag
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    /// Create a filter for multiple tags
    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    /// Parse a selector: `*` matches everything, anything else is a tag name
    pub fn selector(selector: &str) -> Self {
        match selector.trim() {
            "*" => Filter::Any,
            tag => Filter::tag(tag),
        }
    }

    /// Check if this filter matches a tag
    pub fn matches(&self, tag: &str) -> bool {
        let tag_lower = tag.to_lowercase();
        match self {
            Filter::TagName(t) => tag_lower == *t,
            Filter::TagNames(tags) => tags.contains(&tag_lower),
            Filter::Any => true,
        }
    }
}

/// A rule defines how to convert a matched HTML element to Markdown
pub struct Rule {
    /// Filter to determine which elements this rule applies to
    pub filter: Filter,
    /// Higher priorities win when several rules in one table match
    pub priority: i32,
    /// Replacement function that generates Markdown
    replacement: ReplacementFn,
}

impl Rule {
    /// Create a new rule
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef<'_>, &str, &ConversionOptions) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            filter,
            priority: 0,
            replacement: Box::new(replacement),
        }
    }

    /// Create a rule that matches a single tag
    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef<'_>, &str, &ConversionOptions) -> Result<String> + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    /// Create a rule that matches multiple tags
    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef<'_>, &str, &ConversionOptions) -> Result<String> + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Apply this rule's replacement
    pub fn replace(
        &self,
        node: &NodeRef<'_>,
        content: &str,
        options: &ConversionOptions,
    ) -> Result<String> {
        (self.replacement)(node, content, options)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("filter", &self.filter)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// One rule table: named rules in declaration order plus a tag index.
#[derive(Debug, Default)]
pub struct RuleSet {
    rules: IndexMap<String, Rule>,
    by_tag: IndexMap<String, Vec<usize>>,
    wildcard: Vec<usize>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule under `key`. Re-using a key replaces the rule in place.
    pub fn insert(&mut self, key: &str, rule: Rule) {
        self.rules.insert(key.to_string(), rule);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.by_tag.clear();
        self.wildcard.clear();
        for (index, rule) in self.rules.values().enumerate() {
            match &rule.filter {
                Filter::TagName(tag) => self.by_tag.entry(tag.clone()).or_default().push(index),
                Filter::TagNames(tags) => {
                    for tag in tags {
                        self.by_tag.entry(tag.clone()).or_default().push(index);
                    }
                }
                Filter::Any => self.wildcard.push(index),
            }
        }
    }

    /// Index of the rule for a tag: highest priority, earliest declaration on ties
    pub fn lookup(&self, tag: &str) -> Option<usize> {
        let tag = tag.to_lowercase();
        let tagged = self.by_tag.get(&tag).map(Vec::as_slice).unwrap_or_default();

        tagged
            .iter()
            .chain(self.wildcard.iter())
            .copied()
            .map(|index| (index, self.rules[index].priority))
            .min_by_key(|&(index, priority)| (std::cmp::Reverse(priority), index))
            .map(|(index, _)| index)
    }

    /// The rule for a tag, if any
    pub fn get_rule(&self, tag: &str) -> Option<&Rule> {
        self.lookup(tag).map(|index| &self.rules[index])
    }

    /// Rule at an index returned by [`RuleSet::lookup`]
    pub fn rule(&self, index: usize) -> Option<&Rule> {
        self.rules.get_index(index).map(|(_, rule)| rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
