use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use futures::future::try_join_all;
use tracing::{info, instrument, warn};

use super::mime::extension_for;
use super::{ImageEntry, ImageManifest, UNKNOWN_EXTENSION, disambiguate, encode_path};
use crate::capability::AssetFetcher;
use crate::error::{ClipError, Result};
use crate::options::ImageStyle;

/// Fetches every image in `manifest` before the clip is saved.
///
/// All fetches run concurrently and the stage fails as a whole if any
/// one of them fails. Afterwards, in manifest order:
///
/// - with [`ImageStyle::Base64`] each source in `markdown` is replaced by a
///   `data:` URI and the image leaves the manifest;
/// - otherwise a file name ending in [`UNKNOWN_EXTENSION`] gets the
///   extension of the fetched media type (kept as is when the type is
///   unknown), and references to it in `markdown` are rewritten.
///
/// The returned manifest carries each image's payload so it is not
/// fetched twice.
#[instrument(
    name = "pre_download",
    skip(markdown, manifest, fetcher),
    fields(images = manifest.len(), style = ?image_style)
)]
pub async fn pre_download<F>(
    markdown: String,
    manifest: ImageManifest,
    image_style: ImageStyle,
    fetcher: &F,
) -> Result<(String, ImageManifest)>
where
    F: AssetFetcher + ?Sized,
{
    let fetches = manifest.iter().map(|(src, _)| async move {
        fetcher.fetch(src).await.map_err(|source| {
            warn!(src, error = %source, "image fetch failed");
            ClipError::Fetch {
                src: src.to_string(),
                source,
            }
        })
    });
    let payloads = try_join_all(fetches).await?;

    let mut markdown = markdown;
    let mut resolved = ImageManifest::new();
    let mut inlined = 0usize;
    let mut renamed = 0usize;

    for ((src, entry), payload) in manifest.iter().zip(payloads) {
        if image_style == ImageStyle::Base64 {
            let data_uri = format!(
                "data:{};base64,{}",
                payload.mime(),
                STANDARD.encode(&payload.bytes)
            );
            markdown = replace_targets(&markdown, src, &data_uri, false);
            inlined += 1;
            continue;
        }

        let known = extension_for(payload.content_type.as_deref(), &payload.bytes);
        let filename = match entry.filename.strip_suffix(UNKNOWN_EXTENSION).zip(known) {
            Some((stem, extension)) => {
                let filename = disambiguate(format!("{stem}.{extension}"), |name| {
                    resolved.contains_filename(name)
                        || manifest
                            .iter()
                            .any(|(other, e)| other != src && e.filename == name)
                });
                markdown = rewrite(&markdown, &entry.filename, &filename, image_style);
                renamed += 1;
                filename
            }
            None => entry.filename.clone(),
        };

        resolved.insert(
            src,
            ImageEntry {
                filename,
                payload: Some(payload),
            },
        );
    }

    info!(
        fetched = manifest.len(),
        inlined, renamed, "pre-downloaded images"
    );
    Ok((markdown, resolved))
}

/// Rewrites references to `from` the way the image style wrote them.
fn rewrite(markdown: &str, from: &str, to: &str, style: ImageStyle) -> String {
    match style {
        ImageStyle::Obsidian => replace_targets(markdown, from, to, true),
        ImageStyle::ObsidianNoFolder => {
            replace_targets(markdown, file_part(from), file_part(to), true)
        }
        _ => replace_targets(markdown, &encode_path(from), &encode_path(to), false),
    }
}

fn file_part(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Replaces `from` only where it is a whole image target.
///
/// Embeds are `![[target]]`. Other images are `](target` followed by `)`
/// or a title, or a `]: target` reference definition.
fn replace_targets(markdown: &str, from: &str, to: &str, embed: bool) -> String {
    if from.is_empty() {
        return markdown.to_string();
    }

    let mut out = String::with_capacity(markdown.len());
    let mut last = 0;
    for (start, _) in markdown.match_indices(from) {
        let end = start + from.len();
        let before = &markdown[..start];
        let after = &markdown[end..];
        let whole = if embed {
            before.ends_with("[[") && after.starts_with("]]")
        } else {
            (before.ends_with('(') || before.ends_with("]: "))
                && (after.is_empty() || after.starts_with([')', ' ', '\n']))
        };
        if whole {
            out.push_str(&markdown[last..start]);
            out.push_str(to);
            last = end;
        }
    }
    out.push_str(&markdown[last..]);
    out
}
