//! Built-in handling for elements no rule claims.

use std::collections::BTreeSet;

use crate::dom::Element;
use crate::options::{CodeBlockStyle, HeadingStyle, LinkReferenceStyle, LinkStyle, Options};

use super::{Position, RenderContext, clean_attribute, code, is_block};

/// Emitted as raw HTML.
const KEEP: &[&str] = &["iframe", "sub", "sup", "u", "ins", "small", "big"];

/// Dropped with everything inside them.
const REMOVE: &[&str] = &[
    "script", "style", "noscript", "template", "head", "meta", "link", "title",
];

pub(super) fn replacement(
    content: &str,
    node: &Element,
    position: &Position,
    ctx: &mut RenderContext<'_>,
) -> String {
    let options = ctx.options;
    match node.name.as_str() {
        "p" => format!("\n\n{content}\n\n"),
        "br" => "  \n".to_string(),
        name @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
            let level = usize::from(name.as_bytes()[1] - b'0');
            heading(content, level, options)
        }
        "blockquote" => blockquote(content),
        "ul" | "ol" => list(content, position),
        "li" => list_item(content, position, options),
        "pre" if node.first_child_is("code") => code_block(node, options),
        "hr" => format!("\n\n{}\n\n", options.hr),
        "a" => anchor(content, node, ctx),
        "em" | "i" => delimit(content, &options.em_delimiter),
        "strong" | "b" => delimit(content, &options.strong_delimiter),
        "del" | "s" | "strike" => format!("~~{content}~~"),
        "code" if !(position.parent == "pre" && !position.has_siblings()) => inline_code(content),
        "img" => image(node),
        "input" if node.attr("type") == Some("checkbox") && position.parent == "li" => {
            let mark = if node.attr("checked").is_some() { "[x]" } else { "[ ]" };
            format!("{mark} ")
        }
        name if KEEP.contains(&name) => {
            if is_block(name) {
                format!("\n\n{}\n\n", node.outer_html())
            } else {
                node.outer_html()
            }
        }
        name if REMOVE.contains(&name) => String::new(),
        name if is_block(name) => format!("\n\n{content}\n\n"),
        _ => content.to_string(),
    }
}

fn heading(content: &str, level: usize, options: &Options) -> String {
    if options.heading_style == HeadingStyle::Setext && level < 3 {
        let underline = if level == 1 { "=" } else { "-" };
        format!(
            "\n\n{content}\n{}\n\n",
            underline.repeat(content.chars().count())
        )
    } else {
        format!("\n\n{} {content}\n\n", "#".repeat(level))
    }
}

fn blockquote(content: &str) -> String {
    let quoted = content
        .trim_matches('\n')
        .split('\n')
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n\n{quoted}\n\n")
}

fn list(content: &str, position: &Position) -> String {
    if position.parent == "li" && position.is_last_element {
        format!("\n{content}")
    } else {
        format!("\n\n{content}\n\n")
    }
}

fn list_item(content: &str, position: &Position, options: &Options) -> String {
    let prefix = if position.parent == "ol" {
        let index = position.element_index as i64;
        format!("{}. ", position.parent_start.map_or(index + 1, |start| start + index))
    } else {
        format!("{} ", options.bullet_list_marker)
    };

    let body = content.trim_start_matches('\n');
    let trimmed = body.trim_end_matches('\n');
    let indent = format!("\n{}", " ".repeat(prefix.chars().count()));

    let mut item = format!("{prefix}{}", trimmed.replace('\n', &indent));
    if trimmed.len() != body.len() || position.has_next_sibling {
        item.push('\n');
    }
    item
}

fn code_block(node: &Element, options: &Options) -> String {
    let Some(code) = node.child_elements().next() else {
        return String::new();
    };
    match options.code_block_style {
        CodeBlockStyle::Fenced => code::fenced_block(code, options),
        CodeBlockStyle::Indented => {
            let text = code.text_content().replace('\n', "\n    ");
            format!("\n\n    {text}\n\n")
        }
    }
}

fn anchor(content: &str, node: &Element, ctx: &mut RenderContext<'_>) -> String {
    let Some(href) = node.attr("href").filter(|href| !href.is_empty()) else {
        return content.to_string();
    };
    let title = clean_attribute(node.attr("title"));
    let title = if title.is_empty() {
        title
    } else {
        format!(" \"{}\"", title.replace('"', "\\\""))
    };

    match ctx.options.link_style {
        LinkStyle::Inlined => {
            let href = href.replace('(', "\\(").replace(')', "\\)");
            format!("[{content}]({href}{title})")
        }
        LinkStyle::Referenced => match ctx.options.link_reference_style {
            LinkReferenceStyle::Full => {
                let id = ctx.link_references.len() + 1;
                ctx.link_references.push(format!("[{id}]: {href}{title}"));
                format!("[{content}][{id}]")
            }
            LinkReferenceStyle::Collapsed => {
                ctx.link_references.push(format!("[{content}]: {href}{title}"));
                format!("[{content}][]")
            }
            LinkReferenceStyle::Shortcut => {
                ctx.link_references.push(format!("[{content}]: {href}{title}"));
                format!("[{content}]")
            }
        },
        LinkStyle::StripLinks => content.to_string(),
    }
}

fn delimit(content: &str, delimiter: &str) -> String {
    if content.trim().is_empty() {
        String::new()
    } else {
        format!("{delimiter}{content}{delimiter}")
    }
}

fn inline_code(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    let code = content.replace("\r\n", " ").replace(['\r', '\n'], " ");

    let padded = code.starts_with('`')
        || code.ends_with('`')
        || (code.len() > 1
            && code.starts_with(' ')
            && code.ends_with(' ')
            && code.contains(|c: char| c != ' '));
    let padding = if padded { " " } else { "" };

    let runs: BTreeSet<usize> = code
        .split(|c: char| c != '`')
        .map(str::len)
        .filter(|len| *len > 0)
        .collect();
    let width = (1..).find(|len| !runs.contains(len)).unwrap_or(1);
    let delimiter = "`".repeat(width);

    format!("{delimiter}{padding}{code}{padding}{delimiter}")
}

fn image(node: &Element) -> String {
    let src = node.attr("src").unwrap_or_default();
    if src.is_empty() {
        return String::new();
    }
    let alt = clean_attribute(node.attr("alt"));
    let title = clean_attribute(node.attr("title"));
    let title = if title.is_empty() {
        title
    } else {
        format!(" \"{title}\"")
    };
    format!("![{alt}]({src}{title})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_code_delimiter_skips_existing_runs() {
        assert_eq!(inline_code("plain"), "`plain`");
        assert_eq!(inline_code("a ` b"), "``a ` b``");
        assert_eq!(inline_code("a `` b ` c"), "```a `` b ` c```");
        assert_eq!(inline_code(" padded "), "`  padded  `");
        assert_eq!(inline_code("two\nlines"), "`two lines`");
    }

    #[test]
    fn delimiters_skip_blank_content() {
        assert_eq!(delimit(" ", "**"), "");
        assert_eq!(delimit("x", "**"), "**x**");
    }

    #[test]
    fn list_item_indents_continuation_lines() {
        let position = Position {
            parent: "ol".to_string(),
            element_index: 9,
            has_next_sibling: true,
            ..Default::default()
        };
        assert_eq!(
            list_item("\n\nfirst\nsecond\n\n", &position, &Options::default()),
            "10. first\n    second\n"
        );
    }

    #[test]
    fn image_without_src_is_dropped() {
        let img = Element::parse_fragment("<img alt=\"x\">");
        let img = img.child_elements().next().unwrap();
        assert_eq!(image(img), "");

        let img = Element::parse_fragment("<img src=\"a.png\" alt=\"A\" title=\"T\">");
        let img = img.child_elements().next().unwrap();
        assert_eq!(image(img), "![A](a.png \"T\")");
    }
}
