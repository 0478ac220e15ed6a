//! # mailmark
//!
//! Convert HTML documents and email bodies to Markdown, with metadata.
//!
//! The input string is cleaned (scripts, styles and Office markup removed,
//! entities decoded), parsed into an arena document, classified as email or
//! plain web content, and converted by rule tables: custom rules first,
//! then mail-client rules for email content, then generic HTML rules. The
//! result carries the Markdown together with the title, images, links and,
//! for email, the sender/recipient/subject/date headers.
//!
//! ## Example
//!
//! ```rust
//! use mailmark::MailmarkService;
//!
//! let service = MailmarkService::new();
//! let result = service.convert("<h1>Hi</h1><p>Hello <b>world</b></p>").unwrap();
//! assert_eq!(result.markdown, "# Hi\n\nHello **world**\n");
//! ```
//!
//! ## Example (custom rule)
//!
//! ```rust
//! use mailmark::{MailmarkService, Rule};
//!
//! let mut service = MailmarkService::new();
//! service.add_rule("keepMark", Rule::for_tag("mark", |_, content, _| {
//!     Ok(format!("=={}==", content.trim()))
//! }));
//! let markdown = service.to_markdown("<p>a <mark>b</mark></p>").unwrap();
//! assert_eq!(markdown, "a ==b==\n");
//! ```

mod batch;
mod convert;
pub mod email;
pub mod html;
mod metadata;
pub mod node;
mod rules;
pub mod selector;
mod service;
pub mod table;
mod utilities;

pub use batch::Batch;
pub use convert::MAX_DEPTH;
pub use email::{ClientType, EmailContext, EmailHeaders};
pub use html::{fallback_document, parse_html};
pub use metadata::{extract_metadata, ConversionResult, DocumentMetadata, ImageInfo, LinkInfo};
pub use node::{Document, NodeData, NodeId, NodeRef, NodeType};
pub use rules::{Filter, ReplacementFn, Rule, RuleSet, Rules};
pub use selector::Selector;
pub use service::MailmarkService;
pub use utilities::*;

pub use mailmark_core::{
    decode_entities, encode_entities, escape_markdown, unescape_markdown, CodeBlockStyle,
    ConversionOptions, LinkStyle, TableHandling,
};

/// Error type for mailmark operations
#[derive(Debug, thiserror::Error)]
pub enum MailmarkError {
    #[error("Conversion error: {0}")]
    ConversionError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rule for <{tag}> failed: {message}")]
    RuleError { tag: String, message: String },

    #[error("Unsupported selector: {0}")]
    SelectorError(String),

    #[error("Document nesting exceeds {0} levels")]
    DepthExceeded(usize),
}

pub type Result<T> = std::result::Result<T, MailmarkError>;
