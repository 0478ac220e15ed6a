//! Whitespace and formatting normalization for HTML input and Markdown output.

use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_LINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").unwrap());

/// Collapse every run of whitespace into a single space
pub fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_whitespace = false;

    for c in s.chars() {
        if c.is_whitespace() {
            if !prev_was_whitespace {
                result.push(' ');
                prev_was_whitespace = true;
            }
        } else {
            result.push(c);
            prev_was_whitespace = false;
        }
    }

    result
}

/// Collapse three or more consecutive line breaks (blank lines may hold
/// spaces or tabs) into exactly one blank line.
pub fn collapse_blank_lines(s: &str) -> String {
    BLANK_LINE_RUN.replace_all(s, "\n\n").into_owned()
}

/// Final formatting pass over Markdown text.
///
/// Outside fenced code blocks: heading markers get exactly one following
/// space and a blank line on both sides. Trailing whitespace is removed from
/// every line.
pub fn normalize_formatting(markdown: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut heading_lines: Vec<usize> = Vec::new();
    let mut in_fence = false;

    for line in markdown.split('\n') {
        let line = line.trim_end();
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            lines.push(line.to_string());
            continue;
        }

        if !in_fence {
            if let Some(heading) = normalize_heading(line) {
                heading_lines.push(lines.len());
                lines.push(heading);
                continue;
            }
        }

        lines.push(line.to_string());
    }

    let mut output = String::with_capacity(markdown.len() + heading_lines.len() * 2);
    for (i, line) in lines.iter().enumerate() {
        let is_heading = heading_lines.binary_search(&i).is_ok();
        let prev_is_heading = i > 0 && heading_lines.binary_search(&(i - 1)).is_ok();

        if i > 0 {
            output.push('\n');
            let prev_blank = lines[i - 1].is_empty();
            if !prev_blank && !line.is_empty() && (is_heading || prev_is_heading) {
                output.push('\n');
            }
        }
        output.push_str(line);
    }

    output
}

/// Rewrite `##Title` / `##   Title` to `## Title`. Returns `None` when the
/// line is not an ATX heading.
fn normalize_heading(line: &str) -> Option<String> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let rest = line[level..].trim_start();
    if rest.is_empty() {
        return None;
    }

    Some(format!("{} {}", &line[..level], rest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  b\n\t c"), "a b c");
        assert_eq!(collapse_whitespace("  lead"), " lead");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n  \n \n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\nb"), "a\nb");
    }

    #[test]
    fn test_heading_spacing() {
        assert_eq!(normalize_formatting("##Title"), "## Title");
        assert_eq!(normalize_formatting("#    Title"), "# Title");
    }

    #[test]
    fn test_blank_lines_around_headings() {
        assert_eq!(normalize_formatting("text\n# H\nmore"), "text\n\n# H\n\nmore");
        assert_eq!(normalize_formatting("# H\n\nbody"), "# H\n\nbody");
    }

    #[test]
    fn test_trailing_whitespace() {
        assert_eq!(normalize_formatting("a  \nb\t"), "a\nb");
    }

    #[test]
    fn test_fenced_code_untouched() {
        let input = "```sh\n#comment\necho\n```";
        assert_eq!(normalize_formatting(input), input);
    }

    #[test]
    fn test_not_a_heading() {
        assert_eq!(normalize_formatting("#######"), "#######");
        assert_eq!(normalize_formatting("\\# escaped"), "\\# escaped");
    }
}
