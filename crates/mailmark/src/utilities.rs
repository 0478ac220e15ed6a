//! Tag classification tables and small attribute helpers.

/// Block-level HTML elements
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas",
    "center", "dd", "dir", "div", "dl", "dt", "fieldset", "figcaption",
    "figure", "footer", "form", "frameset", "h1", "h2", "h3", "h4", "h5",
    "h6", "header", "hgroup", "hr", "html", "isindex", "li", "main", "menu",
    "nav", "noframes", "noscript", "ol", "output", "p", "pre", "section",
    "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Elements that flow within text
pub const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "cite", "code", "del", "dfn", "em", "font",
    "i", "img", "ins", "kbd", "mark", "q", "s", "samp", "small", "span",
    "strike", "strong", "sub", "sup", "time", "u", "var",
];

/// Elements whose subtree never produces Markdown
pub const IGNORED_ELEMENTS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link",
    "svg", "object", "embed",
];

/// Check if a tag is a block-level element
pub fn is_block(tag: &str) -> bool {
    BLOCK_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is an inline element
pub fn is_inline(tag: &str) -> bool {
    INLINE_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Check if a tag is skipped during conversion
pub fn is_ignored(tag: &str) -> bool {
    IGNORED_ELEMENTS.contains(&tag.to_lowercase().as_str())
}

/// Clean an attribute value (trim and handle empty)
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_default()
}

/// Lower-cased `class` and `id` values joined by a space, for marker lookups
pub fn class_and_id(class: Option<&str>, id: Option<&str>) -> String {
    let mut markers = String::new();
    for value in [class, id].into_iter().flatten() {
        if !markers.is_empty() {
            markers.push(' ');
        }
        markers.push_str(&value.to_lowercase());
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_block() {
        assert!(is_block("div"));
        assert!(is_block("p"));
        assert!(is_block("DIV"));
        assert!(!is_block("span"));
        assert!(!is_block("a"));
    }

    #[test]
    fn test_is_inline() {
        assert!(is_inline("strong"));
        assert!(is_inline("A"));
        assert!(!is_inline("br"));
        assert!(!is_inline("div"));
    }

    #[test]
    fn test_is_ignored() {
        assert!(is_ignored("script"));
        assert!(is_ignored("STYLE"));
        assert!(!is_ignored("p"));
    }

    #[test]
    fn test_clean_attribute() {
        assert_eq!(clean_attribute(Some("  x.png ")), "x.png");
        assert_eq!(clean_attribute(Some("   ")), "");
        assert_eq!(clean_attribute(None), "");
    }

    #[test]
    fn test_class_and_id() {
        assert_eq!(class_and_id(Some("Gmail_Quote"), Some("Main")), "gmail_quote main");
        assert_eq!(class_and_id(None, Some("sig")), "sig");
        assert_eq!(class_and_id(None, None), "");
    }
}
