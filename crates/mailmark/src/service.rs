//! MailmarkService - the main entry point for HTML to Markdown conversion.

use once_cell::sync::Lazy;
use regex::Regex;

use mailmark_core::{
    collapse_blank_lines, collapse_whitespace, decode_entities, escape_markdown,
    normalize_formatting, ConversionOptions,
};

use crate::convert::TreeConverter;
use crate::email::{detect_context, process_outlook_html};
use crate::html::parse_html;
use crate::metadata::{extract_metadata, ConversionResult};
use crate::rules::{Rule, Rules};
use crate::{MailmarkError, Result};

static SCRIPT_STYLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap()
});

/// The main conversion service.
///
/// Holds options and rule tables; every [`convert`](MailmarkService::convert)
/// call builds its own document and converter state, so a shared service can
/// convert documents from several threads at once.
#[derive(Debug, Default)]
pub struct MailmarkService {
    options: ConversionOptions,
    rules: Rules,
}

impl MailmarkService {
    /// Create a new MailmarkService with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a MailmarkService with custom options
    pub fn with_options(options: ConversionOptions) -> Self {
        Self {
            options,
            rules: Rules::new(),
        }
    }

    /// Convert an HTML document to Markdown plus metadata
    pub fn convert(&self, html: &str) -> Result<ConversionResult> {
        if html.trim().is_empty() {
            return Err(MailmarkError::InvalidInput(
                "HTML input is empty".to_string(),
            ));
        }

        self.run(html).map_err(|err| match err {
            MailmarkError::ConversionError(_) => err,
            other => MailmarkError::ConversionError(other.to_string()),
        })
    }

    /// Convert an HTML document and keep only the Markdown
    pub fn to_markdown(&self, html: &str) -> Result<String> {
        self.convert(html).map(|result| result.markdown)
    }

    /// Add a custom rule; it outranks every built-in rule for its tags
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape markdown special characters in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    /// Get the current options
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut ConversionOptions {
        &mut self.options
    }

    fn run(&self, html: &str) -> Result<ConversionResult> {
        let prepared = self.pre_process(html);
        let document = parse_html(&prepared);
        if document.is_degraded() {
            tracing::debug!("converting degraded plain-text document");
        }

        let context = detect_context(&document);
        let metadata = extract_metadata(&document, &context, &self.options);

        let mut converter =
            TreeConverter::new(&self.rules, &self.options, context.is_email_content);
        let output = converter.convert(document.body())?;
        let markdown = self.post_process(&output);

        tracing::debug!(
            input_len = html.len(),
            markdown_len = markdown.len(),
            images = metadata.images.len(),
            links = metadata.links.len(),
            "converted document"
        );
        Ok(ConversionResult { markdown, metadata })
    }

    /// Text-level cleanup before parsing
    fn pre_process(&self, html: &str) -> String {
        let mut html = SCRIPT_STYLE_RE.replace_all(html, "").into_owned();
        if self.options.handle_outlook_specific {
            html = process_outlook_html(&html);
        }
        let html = decode_entities(&html);
        if self.options.preserve_whitespace {
            return html;
        }
        collapse_whitespace(&html).trim().to_string()
    }

    /// Blank-line collapsing, outer trim, and formatting normalization
    fn post_process(&self, output: &str) -> String {
        let collapsed = collapse_blank_lines(output);
        let trimmed = if self.options.trim_output {
            collapsed.trim_start_matches('\n').trim_end()
        } else {
            collapsed.as_str()
        };

        let mut markdown = normalize_formatting(trimmed);
        if self.options.trim_output && !markdown.is_empty() {
            markdown.push('\n');
        }
        markdown
    }
}
