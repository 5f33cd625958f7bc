//! Clipping rules layered over the built-in handling.
//!
//! Order matters: code blocks first, then math, links and images.

use crate::asset::encode_path;
use crate::dom::Element;
use crate::options::{CodeBlockStyle, ImageRefStyle, ImageStyle, LinkStyle};

use super::{RenderContext, Rule, clean_attribute, code, resolve_url};

/// The clipping rules in priority order.
pub fn default_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(PreRule),
        Box::new(FencedCodeBlockRule),
        Box::new(MathRule),
        Box::new(LinkRule),
        Box::new(ImageRule),
    ]
}

/// A `<pre>` that does not open with `<code>` still becomes a fenced block.
pub struct PreRule;

impl Rule for PreRule {
    fn name(&self) -> &'static str {
        "pre"
    }

    fn filter(&self, node: &mut Element, _ctx: &mut RenderContext<'_>) -> bool {
        node.name == "pre" && !node.first_child_is("code")
    }

    fn replacement(&self, _content: &str, node: &Element, ctx: &mut RenderContext<'_>) -> String {
        code::fenced_block(node, ctx.options)
    }
}

/// `<pre><code>` as a fenced block, carrying the code's language.
pub struct FencedCodeBlockRule;

impl Rule for FencedCodeBlockRule {
    fn name(&self) -> &'static str {
        "fencedCodeBlock"
    }

    fn filter(&self, node: &mut Element, ctx: &mut RenderContext<'_>) -> bool {
        ctx.options.code_block_style == CodeBlockStyle::Fenced
            && node.name == "pre"
            && node.first_child_is("code")
    }

    fn replacement(&self, _content: &str, node: &Element, ctx: &mut RenderContext<'_>) -> String {
        node.child_elements()
            .next()
            .map(|code| code::fenced_block(code, ctx.options))
            .unwrap_or_default()
    }
}

/// Elements whose id names a formula captured during extraction.
pub struct MathRule;

impl Rule for MathRule {
    fn name(&self) -> &'static str {
        "mathjax"
    }

    fn filter(&self, node: &mut Element, ctx: &mut RenderContext<'_>) -> bool {
        node.id().is_some_and(|id| ctx.article.math.contains_key(id))
    }

    fn replacement(&self, _content: &str, node: &Element, ctx: &mut RenderContext<'_>) -> String {
        let Some(math) = node.id().and_then(|id| ctx.article.math.get(id)) else {
            return String::new();
        };
        let tex = math.tex.trim().replace('\u{a0}', "");
        if math.inline {
            format!("${}$", tex.replace('\n', " "))
        } else {
            format!("$$\n{tex}\n$$")
        }
    }
}

/// Resolves link targets against the article's base URI.
///
/// Only claims the element when links are being stripped; otherwise the
/// built-in link handling renders the rewritten anchor.
pub struct LinkRule;

impl Rule for LinkRule {
    fn name(&self) -> &'static str {
        "links"
    }

    fn filter(&self, node: &mut Element, ctx: &mut RenderContext<'_>) -> bool {
        if node.name != "a" {
            return false;
        }
        let Some(href) = node.attr("href").filter(|href| !href.is_empty()) else {
            return false;
        };
        let absolute = resolve_url(href, &ctx.article.base_uri);
        node.set_attr("href", absolute);
        ctx.options.link_style == LinkStyle::StripLinks
    }

    fn replacement(&self, content: &str, _node: &Element, _ctx: &mut RenderContext<'_>) -> String {
        content.to_string()
    }
}

/// Claims every image with a source.
///
/// The source is made absolute; when images are downloaded it is also
/// registered in the manifest and pointed at its local file.
pub struct ImageRule;

impl Rule for ImageRule {
    fn name(&self) -> &'static str {
        "images"
    }

    fn filter(&self, node: &mut Element, ctx: &mut RenderContext<'_>) -> bool {
        if node.name != "img" {
            return false;
        }
        let Some(src) = node.attr("src").filter(|src| !src.is_empty()) else {
            return false;
        };
        let absolute = resolve_url(src, &ctx.article.base_uri);
        node.set_attr("src", absolute.as_str());

        let options = ctx.options;
        if options.download_images {
            let filename = ctx.images.assign(&absolute, options, false);
            let local = match options.image_style {
                ImageStyle::ObsidianNoFolder => {
                    filename.rsplit('/').next().unwrap_or_default().to_string()
                }
                ImageStyle::Obsidian => filename,
                _ => encode_path(&filename),
            };
            if !matches!(
                options.image_style,
                ImageStyle::OriginalSource | ImageStyle::Base64
            ) {
                node.set_attr("src", local);
            }
        }
        true
    }

    fn replacement(&self, _content: &str, node: &Element, ctx: &mut RenderContext<'_>) -> String {
        let options = ctx.options;
        let src = node.attr("src").unwrap_or_default();

        if options.image_style == ImageStyle::NoImage {
            return String::new();
        }
        if options.image_style.is_obsidian() {
            return format!("![[{src}]]");
        }

        let alt = clean_attribute(node.attr("alt"));
        let title = clean_attribute(node.attr("title"));
        let title = if title.is_empty() {
            title
        } else {
            format!(" \"{title}\"")
        };

        match options.image_ref_style {
            ImageRefStyle::Referenced => {
                let id = ctx.image_references.len() + 1;
                ctx.image_references.push(format!("[fig{id}]: {src}{title}"));
                format!("![{alt}][fig{id}]")
            }
            ImageRefStyle::Inlined if src.is_empty() => String::new(),
            ImageRefStyle::Inlined => format!("![{alt}]({src}{title})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Article;
    use crate::options::Options;
    use crate::render::{EscapeStrategy, Renderer, Rendered};

    fn render(html: &str, options: &Options, article: &Article) -> Rendered {
        Renderer::new(options, EscapeStrategy::from_options(options))
            .with_rules(default_rules())
            .render(html, article)
    }

    fn base() -> Article {
        Article::new("", "https://ex.com/a/")
    }

    #[test]
    fn links_and_images_are_made_absolute() {
        let rendered = render(
            "<p>See <a href=\"/x\">this</a> and <img src=\"pic.png\"></p>",
            &Options::default(),
            &base(),
        );
        assert_eq!(
            rendered.markdown,
            "See [this](https://ex.com/x) and ![](https://ex.com/a/pic.png)"
        );
        assert!(rendered.images.is_empty());
    }

    #[test]
    fn stripped_links_keep_their_text() {
        let options = Options {
            link_style: LinkStyle::StripLinks,
            ..Default::default()
        };
        let rendered = render("<p>a <a href=\"/x\">b</a> c</p>", &options, &base());
        assert_eq!(rendered.markdown, "a b c");
    }

    #[test]
    fn downloaded_images_point_at_local_files() {
        let options = Options {
            download_images: true,
            image_prefix: "assets/".to_string(),
            ..Default::default()
        };
        let rendered = render(
            "<p><img src=\"cat.png\" alt=\"a\"><img src=\"/b/cat.png\"><img src=\"cat.png\"></p>",
            &options,
            &base(),
        );
        assert_eq!(
            rendered.markdown,
            "![a](assets/cat.png)![](assets/cat.1.png)![](assets/cat.png)"
        );
        assert_eq!(rendered.images.len(), 2);
        assert_eq!(
            rendered.images.filename("https://ex.com/a/cat.png"),
            Some("assets/cat.png")
        );
        assert_eq!(
            rendered.images.filename("https://ex.com/b/cat.png"),
            Some("assets/cat.1.png")
        );
    }

    #[test]
    fn local_paths_are_uri_encoded() {
        let options = Options {
            download_images: true,
            image_prefix: "my clips/".to_string(),
            ..Default::default()
        };
        let rendered = render("<p><img src=\"a b.png\"></p>", &options, &base());
        assert_eq!(rendered.markdown, "![](my%20clips/a%20b.png)");
    }

    #[test]
    fn obsidian_styles_use_wiki_embeds() {
        let options = Options {
            download_images: true,
            image_prefix: "my clips/".to_string(),
            image_style: ImageStyle::Obsidian,
            ..Default::default()
        };
        let rendered = render("<p><img src=\"pic.png\"></p>", &options, &base());
        assert_eq!(rendered.markdown, "![[my clips/pic.png]]");

        let options = Options {
            image_style: ImageStyle::ObsidianNoFolder,
            ..options
        };
        let rendered = render("<p><img src=\"pic.png\"></p>", &options, &base());
        assert_eq!(rendered.markdown, "![[pic.png]]");
    }

    #[test]
    fn original_source_keeps_remote_url_but_records_the_image() {
        let options = Options {
            download_images: true,
            image_prefix: String::new(),
            image_style: ImageStyle::OriginalSource,
            ..Default::default()
        };
        let rendered = render("<p><img src=\"pic.png\"></p>", &options, &base());
        assert_eq!(rendered.markdown, "![](https://ex.com/a/pic.png)");
        assert_eq!(rendered.images.filename("https://ex.com/a/pic.png"), Some("pic.png"));
    }

    #[test]
    fn no_image_style_drops_images() {
        let options = Options {
            image_style: ImageStyle::NoImage,
            ..Default::default()
        };
        let rendered = render("<p>a<img src=\"pic.png\">b</p>", &options, &base());
        assert_eq!(rendered.markdown, "ab");
    }

    #[test]
    fn referenced_images_follow_the_text() {
        let options = Options {
            image_ref_style: ImageRefStyle::Referenced,
            ..Default::default()
        };
        let rendered = render(
            "<p><img src=\"a.png\" alt=\"A\" title=\"T\"></p>",
            &options,
            &base(),
        );
        assert_eq!(
            rendered.markdown,
            "![A][fig1]\n\n[fig1]: https://ex.com/a/a.png \"T\""
        );
    }

    #[test]
    fn image_references_come_before_link_references() {
        let options = Options {
            image_ref_style: ImageRefStyle::Referenced,
            link_style: LinkStyle::Referenced,
            ..Default::default()
        };
        let rendered = render(
            "<p><a href=\"/x\">x</a><img src=\"a.png\"></p>",
            &options,
            &base(),
        );
        assert_eq!(
            rendered.markdown,
            "[x][1]![][fig1]\n\n[fig1]: https://ex.com/a/a.png\n\n[1]: https://ex.com/x"
        );
    }

    #[test]
    fn math_renders_inline_and_display() {
        let article = base()
            .with_math("math-0", " a\u{a0}+b\n= c ", true)
            .with_math("math-1", "x^2", false);
        let rendered = render(
            "<p>see <span id=\"math-0\">ignored</span></p><div id=\"math-1\">x</div>",
            &Options::default(),
            &article,
        );
        assert_eq!(rendered.markdown, "see $a+b = c$\n\n$$\nx^2\n$$");
    }

    #[test]
    fn pre_without_code_is_fenced() {
        let rendered = render("<pre>a &lt; b\nc</pre>", &Options::default(), &base());
        assert_eq!(rendered.markdown, "```\na < b\nc\n```");
    }

    #[test]
    fn code_language_comes_from_the_code_id() {
        let rendered = render(
            "<pre><code id=\"code-lang-rust\">fn main() {}\n</code></pre>",
            &Options::default(),
            &base(),
        );
        assert_eq!(rendered.markdown, "```rust\nfn main() {}\n```");
    }
}
