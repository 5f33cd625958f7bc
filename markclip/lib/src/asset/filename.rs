//! Local file names for image sources.

use super::mime::extension_for_mime;
use crate::options::Options;
use crate::sanitize::sanitize_filename;

/// Extension marking a file name whose real extension is not yet known.
pub const UNKNOWN_EXTENSION: &str = ".idunno";

/// Guesses the local file name for an image source.
///
/// The base name is everything after the last `/` up to the first `?`.
/// Inline `data:` images are named `image.<ext>` after their media type.
/// The name is sanitized; names without an extension then get
/// [`UNKNOWN_EXTENSION`], to be fixed once the payload's media type is
/// known. Empty or dot-only names become `image` plus the placeholder.
/// The result is prefixed with [`Options::image_prefix`].
///
/// With `prepend_path_prefix`, the clip title's directory (or the title
/// itself when it has none) is put in front of the prefix as well.
///
/// ## Examples
///
/// ```
/// use markclip_lib::{Options, asset::image_filename};
///
/// let options = Options { image_prefix: "img/".into(), ..Default::default() };
/// assert_eq!(image_filename("https://ex.com/a/cat.png?w=10", &options, false), "img/cat.png");
/// assert_eq!(image_filename("https://ex.com/render", &options, false), "img/render.idunno");
/// ```
pub fn image_filename(src: &str, options: &Options, prepend_path_prefix: bool) -> String {
    let name = match data_uri_extension(src) {
        Some(ext) => format!("image.{ext}"),
        None => base_name(src).to_string(),
    };
    let mut filename = sanitize_filename(&name, Some(&options.disallowed_chars));

    if filename.chars().all(|c| c == '.') {
        filename = format!("image{UNKNOWN_EXTENSION}");
    } else if !has_extension(&filename) {
        filename.push_str(UNKNOWN_EXTENSION);
    }

    format!("{}{filename}", prefix(options, prepend_path_prefix))
}

fn prefix(options: &Options, prepend_path_prefix: bool) -> String {
    let image_prefix = options.image_prefix.as_str();
    if !prepend_path_prefix {
        return image_prefix.to_string();
    }
    match options.title.rfind('/') {
        Some(pos) => format!("{}{image_prefix}", &options.title[..=pos]),
        None if image_prefix.starts_with('/') => format!("{}{image_prefix}", options.title),
        None => format!("{}/{image_prefix}", options.title),
    }
}

/// Text after the last `/` and before the first `?`.
///
/// A `?` at the very start does not start a query. A query that begins
/// before the last `/` is ignored.
fn base_name(src: &str) -> &str {
    let start = src.rfind('/').map_or(0, |pos| pos + 1);
    let end = match src.find('?') {
        Some(pos) if pos > 0 && pos >= start => pos,
        _ => src.len(),
    };
    &src[start..end]
}

/// Extension for a `data:<mime>;base64,` source.
///
/// Known media types map to their usual extension; others use the subtype.
fn data_uri_extension(src: &str) -> Option<String> {
    let header = src.strip_prefix("data:")?;
    let mime = &header[..header.find(";base64,")?];
    if let Some(ext) = extension_for_mime(mime) {
        return Some(ext.to_string());
    }
    let subtype = mime.rsplit('/').next().unwrap_or(mime);
    Some(if subtype.is_empty() { "idunno" } else { subtype }.to_string())
}

/// The name has a dot that is not its first character.
fn has_extension(name: &str) -> bool {
    name.rfind('.').is_some_and(|pos| pos > 0)
}
