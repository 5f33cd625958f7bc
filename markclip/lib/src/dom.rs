//! An owned, mutable HTML tree.
//!
//! `scraper` parses; rules need to rewrite attributes (absolute `src`/`href`,
//! local image paths) while the renderer walks the tree, so the parsed
//! document is copied into this small owned representation first.

use scraper::{ElementRef, Html};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are serialized without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Name given to the synthetic root of a parsed fragment.
pub const FRAGMENT: &str = "#fragment";

/// A node in the owned tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    /// The element, when this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    /// Lower-case tag name, or `None` for text.
    pub fn name(&self) -> Option<&str> {
        self.as_element().map(|e| e.name.as_str())
    }
}

/// An HTML element with owned attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Lower-case local name.
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Parses an HTML fragment into a synthetic [`FRAGMENT`] root.
    pub fn parse_fragment(html: &str) -> Self {
        let fragment = Html::parse_fragment(html);
        let mut root = convert(fragment.root_element());
        root.name = FRAGMENT.to_string();
        root
    }

    /// Parses a whole document; the result is the `<html>` element.
    pub fn parse_document(html: &str) -> Self {
        convert(Html::parse_document(html).root_element())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets `name`, replacing any existing value.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Whitespace-separated class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// First child node, text included.
    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn first_child_is(&self, name: &str) -> bool {
        self.first_child().and_then(Node::name) == Some(name)
    }

    /// Child elements, text skipped.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|child| match child {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Depth-first search over descendants (self excluded).
    pub fn find(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Visits self and every descendant element, parents before children.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Element)) {
        visit(self);
        for child in self.child_elements_mut() {
            child.walk_mut(visit);
        }
    }

    /// Visits every descendant element, parents before children.
    pub fn walk(&self, visit: &mut impl FnMut(&Element)) {
        visit(self);
        for child in self.child_elements() {
            child.walk(visit);
        }
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out, false);
        out
    }

    /// Text as a reader sees it: `<br>` becomes a newline, markup is dropped.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out, true);
        out
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        let raw = RAW_TEXT_ELEMENTS.contains(&self.name.as_str());
        for child in &self.children {
            write_node(child, raw, &mut out);
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    /// Replaces the children with a freshly parsed fragment.
    pub fn set_inner_html(&mut self, html: &str) {
        self.children = Element::parse_fragment(html).children;
    }
}

fn convert(element: ElementRef<'_>) -> Element {
    let value = element.value();
    let mut out = Element {
        name: value.name().to_string(),
        attrs: value
            .attrs()
            .map(|(key, val)| (key.to_string(), val.to_string()))
            .collect(),
        children: Vec::new(),
    };

    for child in element.children() {
        match child.value() {
            scraper::Node::Text(text) => out.children.push(Node::Text(String::from(&**text))),
            scraper::Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    out.children.push(Node::Element(convert(child)));
                }
            }
            _ => {}
        }
    }

    out
}

fn collect_text(element: &Element, out: &mut String, visible: bool) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if visible && el.name == "br" => out.push('\n'),
            Node::Element(el) => collect_text(el, out, visible),
        }
    }
}

fn write_node(node: &Node, raw: bool, out: &mut String) {
    match node {
        Node::Text(text) if raw => out.push_str(text),
        Node::Text(text) => out.push_str(&html_escape::encode_text(text)),
        Node::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for (key, value) in &element.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&html_escape::encode_double_quoted_attribute(value));
        out.push('"');
    }
    out.push('>');

    if VOID_ELEMENTS.contains(&element.name.as_str()) {
        return;
    }

    out.push_str(&element.inner_html());
    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
