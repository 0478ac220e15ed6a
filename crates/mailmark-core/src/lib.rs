//! mailmark-core - text-level building blocks for HTML to Markdown conversion
//!
//! This crate holds everything that works on plain strings rather than on a
//! DOM: conversion options, HTML entity decoding/encoding, Markdown escaping,
//! and whitespace/formatting normalization. It is used by `mailmark`, which
//! owns the document tree, rule tables and email heuristics.
//!
//! # Example
//!
//! ```rust
//! use mailmark_core::{decode_entities, escape_markdown, unescape_markdown};
//!
//! assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
//!
//! let escaped = escape_markdown("# snake_case");
//! assert_eq!(escaped, "\\# snake\\_case");
//! assert_eq!(unescape_markdown(&escaped), "# snake_case");
//! ```

mod entities;
mod escape;
mod normalize;
mod options;

pub use entities::{decode_entities, encode_entities};
pub use escape::{escape_markdown, unescape_markdown};
pub use normalize::{collapse_blank_lines, collapse_whitespace, normalize_formatting};
pub use options::{CodeBlockStyle, ConversionOptions, LinkStyle, TableHandling};
