//! Article + options → Markdown and an image manifest.
//!
//! ```text
//! Options ──prepare_options──▶ expanded front/back-matter, image prefix
//!    │
//! Article ──render_article──▶ frontmatter + body + backmatter, normalized
//!    │
//!    └─(downloadImages && eager)──pre_download──▶ final Conversion
//! ```

use tracing::{info, instrument};

use crate::article::Article;
use crate::asset::{ImageManifest, pre_download};
use crate::capability::AssetFetcher;
use crate::error::Result;
use crate::options::{DownloadMode, Options};
use crate::render::{EscapeStrategy, Renderer, default_rules};
use crate::sanitize::sanitize_path;
use crate::template;

/// Result of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub markdown: String,
    pub images: ImageManifest,
}

/// Expands the templated fields of `options` for `article`.
///
/// With `include_template` the front-matter gains a trailing newline and the
/// back-matter a leading one; without it both are emptied. The image prefix
/// is expanded with sanitized values, then sanitized per path segment.
pub fn prepare_options(mut options: Options, article: &Article) -> Options {
    if options.include_template {
        options.frontmatter = format!("{}\n", template::expand(&options.frontmatter, article, None));
        options.backmatter = format!("\n{}", template::expand(&options.backmatter, article, None));
    } else {
        options.frontmatter.clear();
        options.backmatter.clear();
    }

    let disallowed = Some(options.disallowed_chars.as_str());
    let prefix = template::expand(&options.image_prefix, article, disallowed);
    options.image_prefix = sanitize_path(&prefix, disallowed);
    options
}

/// Renders `article` with already prepared `options`.
///
/// The body is framed by the front/back-matter and invisible or control
/// characters are stripped from the result. No fetching happens here.
pub fn render_article(article: &Article, options: &Options) -> Conversion {
    let rendered = Renderer::new(options, EscapeStrategy::from_options(options))
        .with_rules(default_rules())
        .render(&article.content, article);

    let markdown = format!(
        "{}{}{}",
        options.frontmatter, rendered.markdown, options.backmatter
    );
    Conversion {
        markdown: strip_special_chars(&markdown),
        images: rendered.images,
    }
}

/// Converts `article`, eagerly fetching images when the options ask for it.
///
/// `download_images` overrides [`Options::download_images`] when given.
#[instrument(
    name = "convert_article",
    skip(article, options, fetcher),
    fields(base_uri = %article.base_uri)
)]
pub async fn convert_article<F>(
    article: &Article,
    options: Options,
    download_images: Option<bool>,
    fetcher: &F,
) -> Result<Conversion>
where
    F: AssetFetcher + ?Sized,
{
    let mut options = options;
    if let Some(download_images) = download_images {
        options.download_images = download_images;
    }
    let options = prepare_options(options, article);

    let conversion = render_article(article, &options);
    let eager = options.download_images && options.download_mode == DownloadMode::Eager;

    let conversion = if eager && !conversion.images.is_empty() {
        let (markdown, images) =
            pre_download(conversion.markdown, conversion.images, options.image_style, fetcher)
                .await?;
        Conversion { markdown, images }
    } else {
        conversion
    };

    info!(
        bytes = conversion.markdown.len(),
        images = conversion.images.len(),
        eager,
        "converted article"
    );
    Ok(conversion)
}

/// The clip's file name (without extension) from the title template.
///
/// Slashes in substituted values are removed; slashes written in the
/// template itself survive as directory separators.
pub fn format_title(article: &Article, options: &Options) -> String {
    let disallowed = format!("{}/", options.disallowed_chars);
    let title = template::expand(&options.title, article, Some(&disallowed));
    sanitize_path(&title, Some(&options.disallowed_chars))
}

/// Folder clips are saved under, always ending in `/`.
///
/// Only applies to eager downloads with a configured `mdClipsFolder`;
/// otherwise empty.
pub fn format_clips_folder(article: &Article, options: &Options) -> String {
    let Some(folder) = options
        .md_clips_folder
        .as_deref()
        .filter(|folder| !folder.is_empty())
    else {
        return String::new();
    };
    if options.download_mode != DownloadMode::Eager {
        return String::new();
    }

    let disallowed = Some(options.disallowed_chars.as_str());
    let mut folder = sanitize_path(&template::expand(folder, article, disallowed), disallowed);
    if !folder.ends_with('/') {
        folder.push('/');
    }
    folder
}

/// Removes control characters and invisible formatting code points.
///
/// Covers C0 controls other than line feed and carriage return, DEL and the
/// C1 range, the soft hyphen, U+061C, zero-width and directional marks,
/// line and paragraph separators, the byte-order mark and the interlinear
/// annotation characters.
pub fn strip_special_chars(text: &str) -> String {
    text.chars().filter(|c| !is_special(*c)).collect()
}

fn is_special(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{9}'
            | '\u{b}'
            | '\u{c}'
            | '\u{e}'..='\u{1f}'
            | '\u{7f}'..='\u{9f}'
            | '\u{ad}'
            | '\u{61c}'
            | '\u{200b}'..='\u{200f}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{feff}'
            | '\u{fff9}'..='\u{fffc}'
    )
}
