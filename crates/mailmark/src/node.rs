//! Arena-backed document tree for HTML to Markdown conversion.
//!
//! Nodes live in a flat `Vec` owned by the [`Document`] and refer to each
//! other by [`NodeId`]. Parent links are plain indices used for navigation
//! only; ownership flows top-down from the root. Rules and heuristics work on
//! [`NodeRef`], a cheap copyable handle pairing a document with a node id.

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;

use crate::selector::Selector;
use crate::utilities::is_block;

/// Index of a node inside its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Node types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
}

/// Payload of a node
#[derive(Debug, Clone)]
pub enum NodeData {
    /// Element with lower-cased tag name and attributes in source order
    Element {
        name: String,
        attributes: IndexMap<String, String>,
    },
    /// Raw character data
    Text(String),
    /// Comment body
    Comment(String),
}

#[derive(Debug)]
struct NodeSlot {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Aggregate text, computed on first request
    text: OnceCell<String>,
}

/// A parsed HTML document.
///
/// Created fresh for every conversion and dropped afterwards.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeSlot>,
    root: NodeId,
    degraded: bool,
}

impl Document {
    /// Create a document whose root is an element with the given tag
    pub fn new(root_tag: &str) -> Self {
        Self::with_root_attrs(root_tag, Vec::new())
    }

    /// Create a document whose root element carries attributes
    pub fn with_root_attrs(root_tag: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            degraded: false,
        };
        document.root = document.push(element_data(root_tag, attrs), None);
        document
    }

    /// Build the degraded representation: the whole input as one text node
    /// inside a synthetic `<body>`. Element queries on it return nothing.
    pub fn degraded(text: &str) -> Self {
        let mut document = Self::new("html");
        let body = document.append_element(document.root, "body", Vec::new());
        document.append_text(body, text);
        document.degraded = true;
        document
    }

    fn push(&mut self, data: NodeData, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeSlot {
            data,
            parent,
            children: Vec::new(),
            text: OnceCell::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    /// Append an element child to `parent`
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: Vec<(&str, &str)>) -> NodeId {
        self.push(element_data(tag, attrs), Some(parent))
    }

    /// Append a text child to `parent`
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()), Some(parent))
    }

    /// Append a comment child to `parent`
    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(NodeData::Comment(text.to_string()), Some(parent))
    }

    /// Whether this document came from the plain-text fallback
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Id of the root element
    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// The root element
    pub fn root(&self) -> NodeRef<'_> {
        self.get(self.root)
    }

    /// Handle for a node id
    pub fn get(&self, id: NodeId) -> NodeRef<'_> {
        NodeRef { doc: self, id }
    }

    /// The `<body>` element, or the root when there is none
    pub fn body(&self) -> NodeRef<'_> {
        let root = self.root();
        if root.tag_name() == "body" {
            return root;
        }
        root.descendants()
            .find(|n| n.tag_name() == "body")
            .unwrap_or(root)
    }

    /// Text of the first `<title>` element
    pub fn title(&self) -> Option<String> {
        self.elements_by_tag("title")
            .into_iter()
            .map(|t| t.text_content().trim().to_string())
            .find(|t| !t.is_empty())
    }

    /// All elements (root included) in document order
    pub fn elements(&self) -> Vec<NodeRef<'_>> {
        if self.degraded {
            return Vec::new();
        }
        let root = self.root();
        std::iter::once(root)
            .chain(root.descendants())
            .filter(NodeRef::is_element)
            .collect()
    }

    /// All elements with the given tag name in document order
    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeRef<'_>> {
        let tag = tag.to_lowercase();
        self.elements()
            .into_iter()
            .filter(|n| n.tag_name() == tag)
            .collect()
    }

    /// First element matching the selector
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeRef<'_>> {
        self.elements().into_iter().find(|n| selector.matches(n))
    }

    /// All elements matching the selector in document order
    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeRef<'_>> {
        self.elements()
            .into_iter()
            .filter(|n| selector.matches(n))
            .collect()
    }
}

fn element_data(tag: &str, attrs: Vec<(&str, &str)>) -> NodeData {
    NodeData::Element {
        name: tag.to_lowercase(),
        attributes: attrs
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v.to_string()))
            .collect(),
    }
}

/// A node handle with access to its document for tree navigation.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    doc: &'a Document,
    id: NodeId,
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl<'a> NodeRef<'a> {
    fn slot(&self) -> &'a NodeSlot {
        &self.doc.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn data(&self) -> &'a NodeData {
        &self.slot().data
    }

    pub fn node_type(&self) -> NodeType {
        match self.slot().data {
            NodeData::Element { .. } => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
            NodeData::Comment(_) => NodeType::Comment,
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type() == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type() == NodeType::Text
    }

    /// Lower-cased tag name, empty for text and comment nodes
    pub fn tag_name(&self) -> &'a str {
        match &self.slot().data {
            NodeData::Element { name, .. } => name.as_str(),
            _ => "",
        }
    }

    /// Character data of a text or comment node
    pub fn value(&self) -> Option<&'a str> {
        match &self.slot().data {
            NodeData::Text(text) | NodeData::Comment(text) => Some(text.as_str()),
            NodeData::Element { .. } => None,
        }
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        match &self.slot().data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Check if an attribute exists
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.slot().parent.map(|id| self.doc.get(id))
    }

    /// Get all child nodes
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let doc = self.doc;
        self.slot().children.iter().map(move |&id| doc.get(id))
    }

    /// Get only element children
    pub fn element_children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        self.children().filter(NodeRef::is_element)
    }

    fn sibling(&self, offset: isize) -> Option<NodeRef<'a>> {
        let parent = self.parent()?;
        let siblings = &parent.slot().children;
        let index = siblings.iter().position(|&id| id == self.id)?;
        let target = index.checked_add_signed(offset)?;
        siblings.get(target).map(|&id| self.doc.get(id))
    }

    pub fn prev_sibling(&self) -> Option<NodeRef<'a>> {
        self.sibling(-1)
    }

    pub fn next_sibling(&self) -> Option<NodeRef<'a>> {
        self.sibling(1)
    }

    /// 1-based position among the parent's element children
    pub fn element_index(&self) -> usize {
        self.parent()
            .and_then(|p| p.element_children().position(|c| c.id == self.id))
            .map_or(1, |i| i + 1)
    }

    /// Ancestors from the parent up to the root
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        std::iter::successors(self.parent(), NodeRef::parent)
    }

    /// Check whether any ancestor has the given tag
    pub fn has_ancestor(&self, tag: &str) -> bool {
        self.ancestors().any(|a| a.tag_name() == tag)
    }

    /// All descendants in document order (pre-order), excluding self
    pub fn descendants(&self) -> Descendants<'a> {
        let mut stack: Vec<NodeId> = self.slot().children.clone();
        stack.reverse();
        Descendants {
            doc: self.doc,
            stack,
        }
    }

    /// First descendant element with the given tag
    pub fn find_descendant(&self, tag: &str) -> Option<NodeRef<'a>> {
        self.descendants().find(|n| n.tag_name() == tag)
    }

    /// Concatenated text of this node and all descendants
    pub fn text_content(&self) -> &'a str {
        let slot = self.slot();
        match &slot.data {
            NodeData::Text(text) => text.as_str(),
            NodeData::Comment(_) => "",
            NodeData::Element { .. } => slot
                .text
                .get_or_init(|| {
                    self.descendants()
                        .filter_map(|n| match n.data() {
                            NodeData::Text(text) => Some(text.as_str()),
                            _ => None,
                        })
                        .collect()
                })
                .as_str(),
        }
    }

    /// Text with line breaks around block elements and at `<br>`.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        collect_inner_text(*self, &mut out);
        out.lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    /// Check this node against a selector
    pub fn matches(&self, selector: &Selector) -> bool {
        selector.matches(self)
    }
}

enum TextStep<'a> {
    Enter(NodeRef<'a>),
    /// Closing edge of a block element
    LeaveBlock,
}

fn collect_inner_text(node: NodeRef<'_>, out: &mut String) {
    let mut steps = vec![TextStep::Enter(node)];
    while let Some(step) = steps.pop() {
        let node = match step {
            TextStep::Enter(node) => node,
            TextStep::LeaveBlock => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                continue;
            }
        };
        match node.data() {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Comment(_) => {}
            NodeData::Element { name, .. } => {
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                if is_block(name) {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    steps.push(TextStep::LeaveBlock);
                }
                let children: Vec<_> = node.children().collect();
                steps.extend(children.into_iter().rev().map(TextStep::Enter));
            }
        }
    }
}

/// Pre-order iterator over the descendants of a node
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.doc.get(id);
        self.stack.extend(node.slot().children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new("html");
        let body = doc.append_element(doc.root_id(), "BODY", Vec::new());
        let div = doc.append_element(body, "div", vec![("Class", "outer")]);
        doc.append_text(div, "Hello ");
        let span = doc.append_element(div, "span", Vec::new());
        doc.append_text(span, "World");
        doc.append_comment(div, "note");
        let p = doc.append_element(body, "p", Vec::new());
        doc.append_text(p, "Second");
        doc
    }

    #[test]
    fn test_tag_names_are_lowercase() {
        let doc = sample();
        assert_eq!(doc.body().tag_name(), "body");
    }

    #[test]
    fn test_attributes() {
        let doc = sample();
        let div = doc.body().find_descendant("div").unwrap();
        assert_eq!(div.attr("class"), Some("outer"));
        assert_eq!(div.attr("CLASS"), Some("outer"));
        assert!(!div.has_attr("id"));
    }

    #[test]
    fn test_children_and_parent() {
        let doc = sample();
        let div = doc.body().find_descendant("div").unwrap();
        assert_eq!(div.children().count(), 3);
        assert_eq!(div.element_children().count(), 1);
        let span = div.find_descendant("span").unwrap();
        assert_eq!(span.parent(), Some(div));
        assert!(span.has_ancestor("body"));
    }

    #[test]
    fn test_text_content() {
        let doc = sample();
        let div = doc.body().find_descendant("div").unwrap();
        assert_eq!(div.text_content(), "Hello World");
        assert_eq!(doc.body().text_content(), "Hello WorldSecond");
    }

    #[test]
    fn test_inner_text_breaks_blocks() {
        let doc = sample();
        assert_eq!(doc.body().inner_text(), "Hello World\nSecond");
    }

    #[test]
    fn test_siblings_and_index() {
        let doc = sample();
        let p = doc.body().find_descendant("p").unwrap();
        assert_eq!(p.element_index(), 2);
        assert_eq!(p.prev_sibling().map(|n| n.tag_name()), Some("div"));
        assert!(p.next_sibling().is_none());
    }

    #[test]
    fn test_descendants_order() {
        let doc = sample();
        let tags: Vec<&str> = doc
            .body()
            .descendants()
            .filter(NodeRef::is_element)
            .map(|n| n.tag_name())
            .collect();
        assert_eq!(tags, vec!["div", "span", "p"]);
    }

    #[test]
    fn test_degraded_document() {
        let doc = Document::degraded("just text");
        assert!(doc.is_degraded());
        assert_eq!(doc.body().tag_name(), "body");
        assert_eq!(doc.body().text_content(), "just text");
        assert!(doc.elements_by_tag("body").is_empty());
    }
}
