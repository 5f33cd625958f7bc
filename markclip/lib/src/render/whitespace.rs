//! Whitespace collapsing ahead of rendering.
//!
//! Runs of ASCII whitespace in text become one space, and spaces next to
//! block boundaries disappear, so the renderer only ever sees whitespace
//! that a browser would display. Text inside `<pre>` is left alone.

use crate::dom::{Element, Node};

use super::{is_block, is_void};

/// Collapses whitespace in every text node below `root`.
pub fn collapse(root: &mut Element) {
    let mut pass = Collapse::default();
    pass.visit_children(root);
    pass.finish();

    let mut texts = pass.texts.into_iter();
    apply(root, &mut texts);
}

#[derive(Default)]
struct Collapse {
    /// New text for every visited text node, in document order; `None` removes it.
    texts: Vec<Option<String>>,
    prev_text: Option<usize>,
    keep_leading_ws: bool,
}

impl Collapse {
    fn visit_children(&mut self, element: &Element) {
        for child in &element.children {
            match child {
                Node::Text(text) => self.text(text),
                Node::Element(el) => {
                    self.boundary(el);
                    if el.name != "pre" && !el.children.is_empty() {
                        self.visit_children(el);
                        self.boundary(el);
                    }
                }
            }
        }
    }

    fn text(&mut self, raw: &str) {
        let mut text = collapse_runs(raw);
        let after_space = match self.prev_text {
            Some(index) => self.texts[index].as_deref().is_none_or(|t| t.ends_with(' ')),
            None => true,
        };
        if after_space && !self.keep_leading_ws && text.starts_with(' ') {
            text.remove(0);
        }

        if text.is_empty() {
            self.texts.push(None);
            return;
        }
        self.texts.push(Some(text));
        self.prev_text = Some(self.texts.len() - 1);
    }

    /// Entering or leaving an element.
    fn boundary(&mut self, el: &Element) {
        if is_block(&el.name) || el.name == "br" {
            self.trim_prev_text();
            self.prev_text = None;
            self.keep_leading_ws = false;
        } else if is_void(&el.name) || el.name == "pre" {
            self.prev_text = None;
            self.keep_leading_ws = true;
        } else if self.prev_text.is_some() {
            self.keep_leading_ws = false;
        }
    }

    fn trim_prev_text(&mut self) {
        if let Some(Some(text)) = self.prev_text.map(|index| &mut self.texts[index])
            && text.ends_with(' ')
        {
            text.pop();
        }
    }

    fn finish(&mut self) {
        self.trim_prev_text();
        if let Some(index) = self.prev_text
            && self.texts[index].as_deref() == Some("")
        {
            self.texts[index] = None;
        }
    }
}

/// Turns every run of space, tab, CR or LF into a single space.
fn collapse_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if matches!(c, ' ' | '\t' | '\r' | '\n') {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Writes the collapsed texts back in the order they were visited.
fn apply(element: &mut Element, texts: &mut impl Iterator<Item = Option<String>>) {
    let children = std::mem::take(&mut element.children);
    for child in children {
        match child {
            Node::Text(_) => {
                if let Some(Some(text)) = texts.next() {
                    element.children.push(Node::Text(text));
                }
            }
            Node::Element(mut el) => {
                if el.name != "pre" {
                    apply(&mut el, texts);
                }
                element.children.push(Node::Element(el));
            }
        }
    }
}
