//! HTML → Markdown rendering.
//!
//! A [`Renderer`] walks an owned HTML tree and asks its [`Rule`]s, in order,
//! whether they want each element. The first rule whose filter accepts the
//! element renders it; elements no rule claims get the built-in handling
//! (paragraphs, headings, lists, emphasis, links, tables and so on).
//!
//! Children are always rendered before their parent's replacement runs, and
//! the pieces are joined so that no more than one blank line ever separates
//! two blocks.
//!
//! ## Examples
//!
//! ```
//! use markclip_lib::{Article, Options};
//! use markclip_lib::render::{EscapeStrategy, Renderer};
//!
//! let options = Options::default();
//! let article = Article::new("", "https://ex.com/");
//! let rendered = Renderer::new(&options, EscapeStrategy::Markdown)
//!     .render("<h2>Title</h2><p>Some <em>text</em>.</p>", &article);
//!
//! assert_eq!(rendered.markdown, "## Title\n\nSome _text_.");
//! ```

mod code;
mod defaults;
mod escape;
pub mod rules;
mod table;
mod url;
mod whitespace;

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use crate::article::Article;
use crate::asset::ImageManifest;
use crate::dom::{Element, Node};
use crate::options::Options;

pub use code::{PRESERVED_BREAK, fence_length, fenced_block, language};
pub use escape::{EscapeStrategy, escape_markdown};
pub use rules::default_rules;
pub use self::url::resolve_url;

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "audio", "blockquote", "body", "canvas", "center", "dd", "dir",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "frameset", "h1",
    "h2", "h3", "h4", "h5", "h6", "header", "hgroup", "hr", "html", "isindex", "li", "main",
    "menu", "nav", "noframes", "noscript", "ol", "output", "p", "pre", "section", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Elements rendered even when they hold no text.
const MEANINGFUL_WHEN_BLANK: &[&str] = &[
    "a", "table", "thead", "tbody", "tfoot", "th", "td", "iframe", "script", "audio", "video",
];

static ATTRIBUTE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\n+\s*)+").expect("valid attribute break regex"));

pub fn is_block(name: &str) -> bool {
    BLOCK_ELEMENTS.contains(&name)
}

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// Collapses line-break runs in an attribute value into single newlines.
pub fn clean_attribute(value: Option<&str>) -> String {
    value
        .map(|value| ATTRIBUTE_BREAKS.replace_all(value, "\n").into_owned())
        .unwrap_or_default()
}

/// A custom rendering rule.
///
/// `filter` sees the element before its children are rendered and may
/// rewrite its attributes. `replacement` receives the rendered children.
pub trait Rule: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn filter(&self, node: &mut Element, ctx: &mut RenderContext<'_>) -> bool;

    fn replacement(&self, content: &str, node: &Element, ctx: &mut RenderContext<'_>) -> String;
}

/// State owned by a single render call.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub options: &'a Options,
    pub article: &'a Article,
    /// Images named so far.
    pub images: ImageManifest,
    /// `[figN]: src` lines, flushed once at the end.
    pub image_references: Vec<String>,
    /// Reference-style link definitions, flushed after the image references.
    pub link_references: Vec<String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(options: &'a Options, article: &'a Article) -> Self {
        Self {
            options,
            article,
            images: ImageManifest::new(),
            image_references: Vec::new(),
            link_references: Vec::new(),
        }
    }
}

/// Output of one render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub markdown: String,
    pub images: ImageManifest,
}

/// Where an element sits among its siblings.
#[derive(Debug, Clone, Default)]
pub(crate) struct Position {
    pub parent: String,
    /// `start` attribute of an `<ol>` parent.
    pub parent_start: Option<i64>,
    /// Index among the parent's element children.
    pub element_index: usize,
    pub has_previous_sibling: bool,
    pub has_next_sibling: bool,
    /// No element follows among the siblings.
    pub is_last_element: bool,
    /// The text just before the element ends with a space.
    pub left_flanked: bool,
    /// The text just after the element starts with a space.
    pub right_flanked: bool,
}

impl Position {
    fn of(parent: &Element, index: usize, element_index: usize) -> Self {
        let children = &parent.children;
        let inline = matches!(&children[index], Node::Element(el) if !is_block(&el.name));
        let left = index.checked_sub(1).and_then(|i| children.get(i));
        let right = children.get(index + 1);

        Self {
            parent: parent.name.clone(),
            parent_start: parent.attr("start").and_then(|s| s.trim().parse().ok()),
            element_index,
            has_previous_sibling: left.is_some(),
            has_next_sibling: right.is_some(),
            is_last_element: children[index + 1..]
                .iter()
                .all(|child| matches!(child, Node::Text(_))),
            left_flanked: inline && left.is_some_and(|n| flanked_by_space(n, |t| t.ends_with(' '))),
            right_flanked: inline
                && right.is_some_and(|n| flanked_by_space(n, |t| t.starts_with(' '))),
        }
    }

    pub fn has_siblings(&self) -> bool {
        self.has_previous_sibling || self.has_next_sibling
    }
}

fn flanked_by_space(sibling: &Node, test: impl Fn(&str) -> bool) -> bool {
    match sibling {
        Node::Text(text) => test(text),
        Node::Element(el) if !is_block(&el.name) => test(&el.text_content()),
        Node::Element(_) => false,
    }
}

/// Renders HTML fragments to Markdown.
pub struct Renderer<'a> {
    options: &'a Options,
    escape: EscapeStrategy,
    rules: Vec<Box<dyn Rule>>,
}

impl<'a> Renderer<'a> {
    /// A renderer with built-in handling only.
    pub fn new(options: &'a Options, escape: EscapeStrategy) -> Self {
        Self {
            options,
            escape,
            rules: Vec::new(),
        }
    }

    /// Adds rules ahead of the built-in handling; earlier rules win.
    pub fn with_rules(mut self, rules: Vec<Box<dyn Rule>>) -> Self {
        self.rules.extend(rules);
        self
    }

    /// Renders `html`, resolving links and images against `article`.
    pub fn render(&self, html: &str, article: &Article) -> Rendered {
        let mut root = Element::parse_fragment(html);
        whitespace::collapse(&mut root);

        let mut ctx = RenderContext::new(self.options, article);
        let mut output = self.process(&mut root, false, &mut ctx);

        join_into(&mut output, &references(&ctx.image_references));
        join_into(&mut output, &references(&ctx.link_references));
        ctx.image_references.clear();
        ctx.link_references.clear();

        let markdown = output
            .trim_start_matches(['\t', '\r', '\n'])
            .trim_end()
            .to_string();

        trace!(
            bytes = markdown.len(),
            images = ctx.images.len(),
            "rendered fragment"
        );

        Rendered {
            markdown,
            images: ctx.images,
        }
    }

    /// Renders the children of `parent` and joins them.
    fn process(&self, parent: &mut Element, in_code: bool, ctx: &mut RenderContext<'_>) -> String {
        let mut output = String::new();
        let mut element_index = 0;

        for index in 0..parent.children.len() {
            let position = match &parent.children[index] {
                Node::Element(_) => Some(Position::of(parent, index, element_index)),
                Node::Text(_) => None,
            };

            let replacement = match (&mut parent.children[index], position) {
                (Node::Text(text), _) if in_code => text.clone(),
                (Node::Text(text), _) => self.escape.apply(text).into_owned(),
                (Node::Element(element), Some(position)) => {
                    element_index += 1;
                    self.replacement_for(element, &position, in_code, ctx)
                }
                (Node::Element(_), None) => String::new(),
            };

            join_into(&mut output, &replacement);
        }

        output
    }

    fn replacement_for(
        &self,
        element: &mut Element,
        position: &Position,
        in_code: bool,
        ctx: &mut RenderContext<'_>,
    ) -> String {
        let block = is_block(&element.name);

        if is_blank(element) {
            if block {
                return "\n\n".to_string();
            }
            let (leading, trailing) = flanking_whitespace(element, position);
            return format!("{leading}{trailing}");
        }

        let rule = self.rules.iter().find(|rule| rule.filter(element, ctx));
        if let Some(rule) = rule {
            trace!(rule = rule.name(), element = %element.name, "rule matched");
        } else if element.name == "table" {
            return self.table(element, ctx);
        }

        let in_code = in_code || element.name == "code";
        let mut content = self.process(element, in_code, ctx);

        let (leading, trailing) = if block {
            (String::new(), String::new())
        } else {
            flanking_whitespace(element, position)
        };
        if !leading.is_empty() || !trailing.is_empty() {
            content = content.trim().to_string();
        }

        let body = match rule {
            Some(rule) => rule.replacement(&content, element, ctx),
            None => defaults::replacement(&content, element, position, ctx),
        };
        format!("{leading}{body}{trailing}")
    }
}

/// Appends `replacement`, keeping at most two newlines at the seam.
fn join_into(output: &mut String, replacement: &str) {
    let kept = output.trim_end_matches('\n').len();
    let trailing = output.len() - kept;
    let tail = replacement.trim_start_matches('\n');
    let leading = replacement.len() - tail.len();

    output.truncate(kept);
    output.push_str(&"\n\n"[..trailing.max(leading).min(2)]);
    output.push_str(tail);
}

fn references(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("\n\n{}\n\n", lines.join("\n"))
    }
}

/// No text and nothing that renders without text.
fn is_blank(element: &Element) -> bool {
    let meaningful = |el: &Element| {
        is_void(&el.name) || MEANINGFUL_WHEN_BLANK.contains(&el.name.as_str())
    };
    !meaningful(element)
        && element.text_content().trim().is_empty()
        && element.find(&meaningful).is_none()
}

/// Whitespace at the edges of an inline element, moved outside its markup.
///
/// ASCII whitespace already supplied by a neighbour is dropped.
fn flanking_whitespace(element: &Element, position: &Position) -> (String, String) {
    let text = element.text_content();
    let is_ascii_ws = |c: char| matches!(c, ' ' | '\t' | '\r' | '\n');

    let body_start = text.find(|c: char| !c.is_whitespace()).unwrap_or(text.len());
    let leading = &text[..body_start];
    let leading_ascii_len = leading.len() - leading.trim_start_matches(is_ascii_ws).len();

    let trailing = if body_start == text.len() {
        ""
    } else {
        &text[text.trim_end().len()..]
    };
    let trailing_ascii_len = trailing.len() - trailing.trim_end_matches(is_ascii_ws).len();

    let leading = if leading_ascii_len > 0 && position.left_flanked {
        &leading[leading_ascii_len..]
    } else {
        leading
    };
    let trailing = if trailing_ascii_len > 0 && position.right_flanked {
        &trailing[..trailing.len() - trailing_ascii_len]
    } else {
        trailing
    };

    (leading.to_string(), trailing.to_string())
}
