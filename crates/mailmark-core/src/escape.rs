//! Markdown escaping for plain text runs.

use once_cell::sync::Lazy;
use regex::Regex;

static LINE_LEADING_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([#>+\-*])").unwrap());

static LINE_LEADING_ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(\d+)\.").unwrap());

static ESCAPED_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\([\\`*_{}\[\]()#+\-.!|>~])").unwrap());

/// Emphasis-like markers and the doubled form that suppresses their escaping
const INLINE_MARKERS: &[(char, &str)] = &[('*', "**"), ('_', "__"), ('`', "``")];

/// Escape Markdown-significant characters in a text run.
///
/// Backslashes are always escaped. `*`, `_` and backticks are escaped only
/// when the text does not already contain the doubled marker (text that
/// looks intentionally formatted is left alone). Block markers at the start
/// of a line (`#`, `>`, `+`, `-`, `*`, `1.`) are escaped so the text cannot
/// turn into a heading, quote or list.
pub fn escape_markdown(text: &str) -> String {
    let mut result = text.replace('\\', "\\\\");

    for &(marker, doubled) in INLINE_MARKERS {
        if !text.contains(doubled) && result.contains(marker) {
            result = result.replace(marker, &format!("\\{marker}"));
        }
    }

    let result = LINE_LEADING_MARKER.replace_all(&result, r"\$1");
    LINE_LEADING_ORDERED
        .replace_all(&result, r"${1}\.")
        .into_owned()
}

/// Remove backslash escapes from the fixed Markdown punctuation set.
pub fn unescape_markdown(text: &str) -> String {
    ESCAPED_PUNCTUATION.replace_all(text, "$1").into_owned()
}
