//! Configuration options for HTML to Markdown conversion

use serde::{Deserialize, Serialize};

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeBlockStyle {
    /// Use fenced code blocks (```)
    #[default]
    Fenced,
    /// Use indented code blocks (4 spaces)
    Indented,
}

/// Link style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// Use inline links [text](url)
    #[default]
    Inlined,
    /// Drop the link target and keep only the text
    Plain,
}

/// What to do with tables that look like data tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableHandling {
    /// Render as a pipe table
    #[default]
    Convert,
    /// Drop the table entirely
    Remove,
    /// Keep the grid; rendered as a pipe table as well
    Preserve,
}

/// Options for the conversion pipeline.
///
/// Field names deserialize in camelCase (`preserveWhitespace`,
/// `bulletListMarker`, ...) and every field has a default, so `{}` is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Skip whitespace collapsing and text escaping
    pub preserve_whitespace: bool,

    /// Bullet list marker
    pub bullet_list_marker: char,

    /// Code block style
    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    /// Emphasis delimiter
    pub em_delimiter: String,

    /// Strong delimiter
    pub strong_delimiter: String,

    /// Link style
    pub link_style: LinkStyle,

    /// Data table handling
    pub table_handling: TableHandling,

    /// Keep signature blocks (under a horizontal rule) instead of dropping them
    pub handle_email_signatures: bool,

    /// Keep quoted replies as block quotes instead of dropping them
    pub preserve_email_quotes: bool,

    /// Map inline `font-weight`/`font-style`/`color` styles to Markdown
    pub convert_inline_styles: bool,

    /// Run the Outlook cleanup pass before parsing
    pub handle_outlook_specific: bool,

    /// Extract From/To/Subject/Date into the metadata
    pub preserve_email_headers: bool,

    /// Trim the final Markdown and end it with a single newline
    pub trim_output: bool,

    /// Number of documents converted per batch chunk
    pub batch_size: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            preserve_whitespace: false,
            bullet_list_marker: '-',
            code_block_style: CodeBlockStyle::Fenced,
            fence: "```".to_string(),
            em_delimiter: "*".to_string(),
            strong_delimiter: "**".to_string(),
            link_style: LinkStyle::Inlined,
            table_handling: TableHandling::Convert,
            handle_email_signatures: true,
            preserve_email_quotes: true,
            convert_inline_styles: true,
            handle_outlook_specific: true,
            preserve_email_headers: true,
            trim_output: true,
            batch_size: 10,
        }
    }
}
