//! Table transpiler: layout detection and pipe-table rendering.

use mailmark_core::{collapse_whitespace, ConversionOptions};

use crate::node::{NodeData, NodeRef};

/// Header inference threshold for tables without `<th>`
const HEADER_CELL_MAX_CHARS: usize = 50;

/// Check whether a table is used for positioning rather than data.
///
/// True for `role="presentation"`, for zero `cellpadding` together with zero
/// `cellspacing`, and for tables without data shape (no `<th>`, or fewer
/// than two rows).
pub fn is_layout_table(table: &NodeRef) -> bool {
    if table
        .attr("role")
        .is_some_and(|role| role.trim().eq_ignore_ascii_case("presentation"))
    {
        return true;
    }
    if table.attr("cellpadding").map(str::trim) == Some("0")
        && table.attr("cellspacing").map(str::trim) == Some("0")
    {
        return true;
    }

    let rows = rows(table);
    let has_header = rows
        .iter()
        .any(|row| row.element_children().any(|c| c.tag_name() == "th"));
    !has_header || rows.len() < 2
}

/// Render a table as a Markdown pipe table
pub fn render(table: &NodeRef, options: &ConversionOptions) -> String {
    let mut lines = Vec::new();

    for (index, row) in rows(table).iter().enumerate() {
        let cells: Vec<NodeRef> = row
            .element_children()
            .filter(|c| matches!(c.tag_name(), "td" | "th"))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let texts: Vec<String> = cells.iter().map(|c| cell_text(c, options)).collect();
        lines.push(format!(
            "| {} |",
            texts
                .iter()
                .map(|t| if t.is_empty() { " " } else { t.as_str() })
                .collect::<Vec<_>>()
                .join(" | ")
        ));

        if index == 0 && is_header_row(&cells, &texts) {
            lines.push(format!("| {} |", vec!["---"; cells.len()].join(" | ")));
        }
    }

    if lines.is_empty() {
        return String::new();
    }
    format!("\n{}\n\n", lines.join("\n"))
}

fn is_header_row(cells: &[NodeRef], texts: &[String]) -> bool {
    if cells.iter().any(|c| c.tag_name() == "th") {
        return true;
    }
    texts.iter().all(|text| {
        text.chars().count() < HEADER_CELL_MAX_CHARS
            && text.chars().next().is_some_and(char::is_uppercase)
    })
}

/// Rows belonging to this table, skipping rows of nested tables
fn rows<'a>(table: &NodeRef<'a>) -> Vec<NodeRef<'a>> {
    table
        .descendants()
        .filter(|n| n.tag_name() == "tr")
        .filter(|row| {
            row.ancestors()
                .find(|a| a.tag_name() == "table")
                .is_some_and(|owner| owner == *table)
        })
        .collect()
}

/// Cell text with bold, italic and code kept as Markdown
fn cell_text(cell: &NodeRef, options: &ConversionOptions) -> String {
    let mut text = String::new();
    for child in cell.children() {
        match child.data() {
            NodeData::Text(value) => text.push_str(value),
            NodeData::Comment(_) => {}
            NodeData::Element { name, .. } => {
                let inner = child.text_content().trim();
                let (open, close) = match name.as_str() {
                    "b" | "strong" => (&options.strong_delimiter[..], &options.strong_delimiter[..]),
                    "i" | "em" => (&options.em_delimiter[..], &options.em_delimiter[..]),
                    "code" => ("`", "`"),
                    _ => ("", ""),
                };
                if inner.is_empty() {
                    text.push_str(child.text_content());
                } else {
                    text.push_str(open);
                    text.push_str(inner);
                    text.push_str(close);
                }
            }
        }
    }

    let text = text.replace('|', "\\|").replace(['\n', '\r'], " ");
    collapse_whitespace(&text).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{Document, NodeId};

    fn table(rows: &[&[(&str, &str)]], attrs: Vec<(&str, &str)>) -> Document {
        let mut doc = Document::with_root_attrs("table", attrs);
        let root = doc.root_id();
        let body: NodeId = doc.append_element(root, "tbody", Vec::new());
        for cells in rows {
            let tr = doc.append_element(body, "tr", Vec::new());
            for (tag, text) in cells.iter() {
                let cell = doc.append_element(tr, tag, Vec::new());
                doc.append_text(cell, text);
            }
        }
        doc
    }

    #[test]
    fn test_header_table() {
        let doc = table(
            &[&[("th", "A"), ("th", "B")], &[("td", "1"), ("td", "2")]],
            Vec::new(),
        );
        assert!(!is_layout_table(&doc.root()));
        assert_eq!(
            render(&doc.root(), &ConversionOptions::default()),
            "\n| A | B |\n| --- | --- |\n| 1 | 2 |\n\n"
        );
    }

    #[test]
    fn test_layout_detection() {
        let single = table(&[&[("th", "A")]], Vec::new());
        assert!(is_layout_table(&single.root()));

        let no_header = table(&[&[("td", "a")], &[("td", "b")]], Vec::new());
        assert!(is_layout_table(&no_header.root()));

        let presentation = table(
            &[&[("th", "A")], &[("td", "1")]],
            vec![("role", "presentation")],
        );
        assert!(is_layout_table(&presentation.root()));

        let spacing = table(
            &[&[("th", "A")], &[("td", "1")]],
            vec![("cellpadding", "0"), ("cellspacing", "0")],
        );
        assert!(is_layout_table(&spacing.root()));
    }

    #[test]
    fn test_inferred_header() {
        let doc = table(
            &[&[("td", "Name"), ("td", "Age")], &[("td", "ann"), ("td", "3")]],
            Vec::new(),
        );
        let out = render(&doc.root(), &ConversionOptions::default());
        assert_eq!(out, "\n| Name | Age |\n| --- | --- |\n| ann | 3 |\n\n");

        let lower = table(&[&[("td", "name")], &[("td", "x")]], Vec::new());
        assert!(!render(&lower.root(), &ConversionOptions::default()).contains("---"));
    }

    #[test]
    fn test_inferred_header_length_cutoff() {
        let short = format!("H{}", "x".repeat(48));
        let long = format!("H{}", "x".repeat(49));
        assert_eq!(short.chars().count(), 49);
        assert_eq!(long.chars().count(), 50);

        let doc = table(&[&[("td", short.as_str())], &[("td", "1")]], Vec::new());
        assert_eq!(
            render(&doc.root(), &ConversionOptions::default()),
            format!("\n| {short} |\n| --- |\n| 1 |\n\n")
        );

        let doc = table(&[&[("td", long.as_str())], &[("td", "1")]], Vec::new());
        assert_eq!(
            render(&doc.root(), &ConversionOptions::default()),
            format!("\n| {long} |\n| 1 |\n\n")
        );
    }

    #[test]
    fn test_cell_escaping_and_empty() {
        let doc = table(&[&[("th", "a|b"), ("th", "")]], Vec::new());
        assert_eq!(
            render(&doc.root(), &ConversionOptions::default()),
            "\n| a\\|b |   |\n| --- | --- |\n\n"
        );
    }

    #[test]
    fn test_cell_formatting() {
        let mut doc = Document::new("table");
        let root = doc.root_id();
        let tr = doc.append_element(root, "tr", Vec::new());
        let td = doc.append_element(tr, "td", Vec::new());
        doc.append_text(td, "see ");
        let b = doc.append_element(td, "b", Vec::new());
        doc.append_text(b, "this");
        doc.append_text(td, "\nand ");
        let code = doc.append_element(td, "code", Vec::new());
        doc.append_text(code, "x");
        assert_eq!(
            cell_text(&doc.get(td), &ConversionOptions::default()),
            "see **this** and `x`"
        );
    }

    #[test]
    fn test_nested_table_rows_excluded() {
        let mut doc = Document::new("table");
        let root = doc.root_id();
        let tr = doc.append_element(root, "tr", Vec::new());
        let td = doc.append_element(tr, "td", Vec::new());
        let inner = doc.append_element(td, "table", Vec::new());
        doc.append_element(inner, "tr", Vec::new());
        assert_eq!(rows(&doc.root()).len(), 1);
    }
}
