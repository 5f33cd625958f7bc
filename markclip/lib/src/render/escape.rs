//! Markdown escaping of text nodes.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::options::Options;

/// Patterns and replacements applied, in order, to each text node.
///
/// Anchored patterns only apply at the start of the node's text.
static ESCAPES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\\", r"\\"),
        (r"\*", r"\*"),
        (r"^-", r"\-"),
        (r"^\+ ", r"\+ "),
        (r"^(=+)", r"\${1}"),
        (r"^(#{1,6}) ", r"\${1} "),
        (r"`", r"\`"),
        (r"^~~~", r"\~~~"),
        (r"\[", r"\["),
        (r"\]", r"\]"),
        (r"^>", r"\>"),
        (r"_", r"\_"),
        (r"^(\d+)\. ", r"${1}\. "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        (
            Regex::new(pattern).expect("valid escape pattern"),
            replacement,
        )
    })
    .collect()
});

/// How text nodes are protected from being read as Markdown syntax.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscapeStrategy {
    /// Backslash-escape Markdown-special characters.
    #[default]
    Markdown,
    /// Emit text untouched.
    None,
}

impl EscapeStrategy {
    /// The strategy selected by [`Options::turndown_escape`].
    pub fn from_options(options: &Options) -> Self {
        if options.turndown_escape {
            Self::Markdown
        } else {
            Self::None
        }
    }

    pub fn apply<'a>(self, text: &'a str) -> Cow<'a, str> {
        match self {
            Self::None => Cow::Borrowed(text),
            Self::Markdown => Cow::Owned(escape_markdown(text)),
        }
    }
}

/// Backslash-escapes characters that would otherwise start Markdown syntax.
///
/// ## Examples
///
/// ```
/// use markclip_lib::render::escape_markdown;
///
/// assert_eq!(escape_markdown("*not bold*"), r"\*not bold\*");
/// assert_eq!(escape_markdown("1. not a list"), r"1\. not a list");
/// ```
pub fn escape_markdown(text: &str) -> String {
    ESCAPES
        .iter()
        .fold(text.to_string(), |acc, (pattern, replacement)| {
            pattern.replace_all(&acc, *replacement).into_owned()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_inline_syntax_everywhere() {
        assert_eq!(escape_markdown("a_b*c`d[e]f"), r"a\_b\*c\`d\[e\]f");
        assert_eq!(escape_markdown(r"C:\path"), r"C:\\path");
    }

    #[test]
    fn escapes_block_syntax_only_at_the_start() {
        assert_eq!(escape_markdown("- item"), r"\- item");
        assert_eq!(escape_markdown("a - b"), "a - b");
        assert_eq!(escape_markdown("## Title"), r"\## Title");
        assert_eq!(escape_markdown("> quote"), r"\> quote");
        assert_eq!(escape_markdown("=== rule"), r"\=== rule");
        assert_eq!(escape_markdown("+ plus"), r"\+ plus");
        assert_eq!(escape_markdown("~~~ fence"), r"\~~~ fence");
        assert_eq!(escape_markdown("42. answer"), r"42\. answer");
    }

    #[test]
    fn none_strategy_leaves_text_alone() {
        assert_eq!(EscapeStrategy::None.apply("*x*"), "*x*");
        assert_eq!(EscapeStrategy::Markdown.apply("*x*"), r"\*x\*");
    }

    #[test]
    fn strategy_follows_the_option() {
        let mut options = Options::default();
        assert_eq!(EscapeStrategy::from_options(&options), EscapeStrategy::Markdown);
        options.turndown_escape = false;
        assert_eq!(EscapeStrategy::from_options(&options), EscapeStrategy::None);
    }
}
