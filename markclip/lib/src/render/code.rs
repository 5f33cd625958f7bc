//! Fenced code blocks.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::Element;
use crate::options::Options;

/// Element standing in for a `<br>` inside `<pre>` until rendering.
pub const PRESERVED_BREAK: &str = "br-keep";

static LANGUAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"code-lang-(.+)").expect("valid language id regex"));

static BREAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid break regex"));

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[^>]+(>|$)").expect("valid tag regex"));

/// Smallest fence longer than every run of `fence_char` in `code`.
///
/// Starts at three; each maximal run of three or more fence characters,
/// wherever it sits on its line, at least as long as the current fence
/// grows it to the run length plus one.
pub fn fence_length(code: &str, fence_char: char) -> usize {
    let mut runs = Vec::new();
    let mut run = 0;
    for c in code.chars() {
        if c == fence_char {
            run += 1;
        } else {
            runs.push(run);
            run = 0;
        }
    }
    runs.push(run);

    runs.into_iter()
        .filter(|run| *run >= 3)
        .fold(3, |size, run| if run >= size { run + 1 } else { size })
}

/// Language named by a `code-lang-<lang>` element id, if any.
pub fn language(node: &Element) -> &str {
    node.id()
        .and_then(|id| LANGUAGE_ID.captures(id))
        .and_then(|caps| caps.get(1))
        .map_or("", |lang| lang.as_str())
}

/// Renders `node` (a `<pre>` or `<code>`) as a fenced code block.
///
/// With a known language the block holds the element's visible text;
/// otherwise its markup with line breaks kept, tags stripped and entities
/// decoded.
pub fn fenced_block(node: &Element, options: &Options) -> String {
    let mut node = node.clone();
    node.walk_mut(&mut |el| {
        if el.name == PRESERVED_BREAK {
            el.name = "br".to_string();
            el.children.clear();
        }
    });

    let language = language(&node);
    let code = if language.is_empty() {
        let html = node.inner_html();
        let html = BREAK_TAG.replace_all(&html, "\n");
        let text = HTML_TAG.replace_all(&html, "");
        html_escape::decode_html_entities(&text).into_owned()
    } else {
        node.inner_text()
    };

    let fence_char = options.fence_char();
    let fence = fence_char.to_string().repeat(fence_length(&code, fence_char));
    let code = code.strip_suffix('\n').unwrap_or(&code);

    format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn first(html: &str) -> Element {
        Element::parse_fragment(html)
            .child_elements()
            .next()
            .cloned()
            .unwrap()
    }

    #[test]
    fn fence_is_three_without_runs() {
        assert_eq!(fence_length("let x = 1;", '`'), 3);
        assert_eq!(fence_length("``two", '`'), 3);
    }

    #[test]
    fn fence_outgrows_runs() {
        assert_eq!(fence_length("```\ncode\n```", '`'), 4);
        assert_eq!(fence_length("a\n`````\nb\n```", '`'), 6);
        assert_eq!(fence_length("~~~~", '~'), 5);
    }

    #[test]
    fn indented_and_mid_line_runs_count() {
        assert_eq!(fence_length("x\n   ```\ny", '`'), 4);
        assert_eq!(fence_length("say ```` here", '`'), 5);
        assert_eq!(fence_length("a ``` b ````` c", '`'), 6);
    }

    proptest! {
        #[test]
        fn fence_is_longer_than_any_run(
            before in "[a-z \n]{0,8}",
            run in 3usize..12,
            after in "[a-z \n]{0,8}",
        ) {
            let code = format!("{before}{}{after}", "`".repeat(run));
            prop_assert!(fence_length(&code, '`') > run);
        }

        #[test]
        fn fence_is_three_when_runs_are_short(code in "([a-z \n]|``?[a-z \n]){0,12}") {
            prop_assert_eq!(fence_length(&code, '`'), 3);
        }
    }

    #[test]
    fn language_comes_from_the_id() {
        assert_eq!(language(&first("<code id=\"code-lang-rust\"></code>")), "rust");
        assert_eq!(language(&first("<code id=\"other\"></code>")), "");
        assert_eq!(language(&first("<code></code>")), "");
    }

    #[test]
    fn block_with_language_uses_visible_text() {
        let code = first("<code id=\"code-lang-js\">let a = 1;<br-keep></br-keep>let b = a &lt; 2;</code>");
        assert_eq!(
            fenced_block(&code, &Options::default()),
            "\n\n```js\nlet a = 1;\nlet b = a < 2;\n```\n\n"
        );
    }

    #[test]
    fn block_without_language_strips_markup() {
        let pre = first("<pre><span class=\"k\">fn</span> main() {}<br>&amp;&amp;\n</pre>");
        assert_eq!(
            fenced_block(&pre, &Options::default()),
            "\n\n```\nfn main() {}\n&&\n```\n\n"
        );
    }

    #[test]
    fn custom_fence_character_is_used() {
        let options = Options {
            fence: "~~~".to_string(),
            ..Default::default()
        };
        let pre = first("<pre>~~~\ninner\n~~~</pre>");
        assert_eq!(fenced_block(&pre, &options), "\n\n~~~~\n~~~\ninner\n~~~\n~~~~\n\n");
    }
}
