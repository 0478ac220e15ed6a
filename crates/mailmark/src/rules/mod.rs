//! Rule system for HTML to Markdown conversion.
//!
//! Three tables take part in dispatch, highest precedence first: custom
//! rules registered by the caller, email rules (only for documents detected
//! as email), and base rules. A tag no table knows is transparent.

mod base;
mod common;
mod email;
mod rule;

pub use base::base_rules;
pub use email::email_rules;
pub use rule::{Filter, ReplacementFn, Rule, RuleSet};

/// Table a resolved rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleSource {
    Custom,
    Email,
    Base,
}

/// Location of a resolved rule, valid until the tables change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleHandle {
    pub source: RuleSource,
    pub index: usize,
}

/// Collection of rule tables for conversion
#[derive(Debug)]
pub struct Rules {
    /// Custom rules added by the user (checked first)
    custom: RuleSet,
    /// Mail-client rules
    email: RuleSet,
    /// Generic HTML rules
    base: RuleSet,
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}

impl Rules {
    /// Create the built-in tables with no custom rules
    pub fn new() -> Self {
        Self {
            custom: RuleSet::new(),
            email: email_rules(),
            base: base_rules(),
        }
    }

    /// Add a custom rule; a repeated key replaces the earlier rule
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom.insert(key, rule);
    }

    /// Find the rule for a tag
    pub fn resolve(&self, tag: &str, email_mode: bool) -> Option<RuleHandle> {
        let handle = |source, index| RuleHandle { source, index };

        if let Some(index) = self.custom.lookup(tag) {
            return Some(handle(RuleSource::Custom, index));
        }
        if email_mode {
            if let Some(index) = self.email.lookup(tag) {
                return Some(handle(RuleSource::Email, index));
            }
        }
        self.base
            .lookup(tag)
            .map(|index| handle(RuleSource::Base, index))
    }

    /// Rule behind a handle returned by [`Rules::resolve`]
    pub fn get(&self, handle: RuleHandle) -> Option<&Rule> {
        let set = match handle.source {
            RuleSource::Custom => &self.custom,
            RuleSource::Email => &self.email,
            RuleSource::Base => &self.base,
        };
        set.rule(handle.index)
    }
}
