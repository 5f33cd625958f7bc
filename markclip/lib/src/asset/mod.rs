//! Image naming, the image manifest and the eager pre-download stage.

mod filename;
pub mod mime;
mod predownload;

use indexmap::IndexMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;

use crate::options::Options;

pub use filename::{UNKNOWN_EXTENSION, image_filename};
pub use predownload::pre_download;

/// Bytes fetched for an image, with the media type they were served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedAsset {
    pub fn new(bytes: impl Into<Vec<u8>>, content_type: Option<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type,
        }
    }

    /// Media type, sniffed from the bytes when the server did not say.
    pub fn mime(&self) -> String {
        mime::mime_for(self.content_type.as_deref(), &self.bytes)
    }
}

/// One manifest entry: the local file name and, after an eager fetch, the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub filename: String,
    pub payload: Option<FetchedAsset>,
}

/// Ordered map from an image's source to its local file name.
///
/// File names are pairwise distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageManifest {
    entries: IndexMap<String, ImageEntry>,
}

impl ImageManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, src: &str) -> Option<&ImageEntry> {
        self.entries.get(src)
    }

    /// Local file name recorded for `src`.
    pub fn filename(&self, src: &str) -> Option<&str> {
        self.entries.get(src).map(|entry| entry.filename.as_str())
    }

    pub fn contains_filename(&self, filename: &str) -> bool {
        self.entries.values().any(|entry| entry.filename == filename)
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ImageEntry)> {
        self.entries.iter().map(|(src, entry)| (src.as_str(), entry))
    }

    /// Records an entry as-is, replacing any previous entry for `src`.
    pub fn insert(&mut self, src: impl Into<String>, entry: ImageEntry) {
        self.entries.insert(src.into(), entry);
    }

    /// Assigns (or returns the already assigned) local file name for `src`.
    ///
    /// A new source whose guessed name is taken gets a counter inserted
    /// before its extension: `cat.png`, `cat.1.png`, `cat.2.png`, ...
    pub fn assign(&mut self, src: &str, options: &Options, prepend_path_prefix: bool) -> String {
        if let Some(existing) = self.filename(src) {
            return existing.to_string();
        }

        let guess = image_filename(src, options, prepend_path_prefix);
        let filename = self.disambiguate(guess);
        debug!(src, filename = %filename, "assigned image filename");
        self.entries.insert(
            src.to_string(),
            ImageEntry {
                filename: filename.clone(),
                payload: None,
            },
        );
        filename
    }

    /// Returns `filename`, or the first counter-suffixed variant not in use.
    pub fn disambiguate(&self, filename: String) -> String {
        disambiguate(filename, |candidate| self.contains_filename(candidate))
    }
}

/// Inserts a counter before the extension of `filename` until `is_taken`
/// rejects it no more.
///
/// The first collision inserts `1` as its own dot-separated segment before
/// the last one; each further collision replaces that segment with the
/// next integer.
pub fn disambiguate(filename: String, is_taken: impl Fn(&str) -> bool) -> String {
    let mut filename = filename;
    let mut counter = 1usize;
    while is_taken(&filename) {
        let mut parts: Vec<String> = filename.split('.').map(String::from).collect();
        if counter == 1 {
            let at = parts.len().saturating_sub(1);
            parts.insert(at, counter.to_string());
        } else {
            let at = parts.len().saturating_sub(2);
            parts[at] = counter.to_string();
        }
        counter += 1;
        filename = parts.join(".");
    }
    filename
}

/// Percent-encodes a local path the way a browser's `encodeURI` does.
///
/// Separators and URL-reserved characters are kept; spaces, brackets and
/// non-ASCII characters are encoded.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, URI_KEEP).to_string()
}

/// Everything `encodeURI` leaves alone besides alphanumerics.
const URI_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';')
    .remove(b',')
    .remove(b'/')
    .remove(b'?')
    .remove(b':')
    .remove(b'@')
    .remove(b'&')
    .remove(b'=')
    .remove(b'+')
    .remove(b'$')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#');

impl IntoIterator for ImageManifest {
    type Item = (String, ImageEntry);
    type IntoIter = indexmap::map::IntoIter<String, ImageEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Options {
        Options {
            image_prefix: "img/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn first_occurrence_keeps_the_plain_name() {
        let mut manifest = ImageManifest::new();
        assert_eq!(manifest.assign("https://a.com/x/cat.png", &options(), false), "img/cat.png");
        assert_eq!(manifest.assign("https://b.com/y/cat.png", &options(), false), "img/cat.1.png");
        assert_eq!(manifest.assign("https://c.com/z/cat.png", &options(), false), "img/cat.2.png");
    }

    #[test]
    fn repeated_source_reuses_its_name() {
        let mut manifest = ImageManifest::new();
        manifest.assign("https://a.com/cat.png", &options(), false);
        let second = manifest.assign("https://b.com/cat.png", &options(), false);
        assert_eq!(manifest.assign("https://b.com/cat.png", &options(), false), second);
        assert_eq!(manifest.len(), 2);
    }

    #[test]
    fn counter_goes_before_the_last_extension() {
        let mut manifest = ImageManifest::new();
        manifest.assign("https://a.com/archive.tar.gz", &options(), false);
        assert_eq!(
            manifest.assign("https://b.com/archive.tar.gz", &options(), false),
            "img/archive.tar.1.gz"
        );
        assert_eq!(
            manifest.assign("https://c.com/archive.tar.gz", &options(), false),
            "img/archive.tar.2.gz"
        );
    }

    #[test]
    fn unknown_extensions_collide_too() {
        let mut manifest = ImageManifest::new();
        manifest.assign("https://a.com/render", &options(), false);
        assert_eq!(
            manifest.assign("https://b.com/render", &options(), false),
            "img/render.1.idunno"
        );
    }

    #[test]
    fn encode_path_matches_encode_uri() {
        assert_eq!(encode_path("My Page/cat 1.png"), "My%20Page/cat%201.png");
        assert_eq!(encode_path("a(1)&b=c'd!.png"), "a(1)&b=c'd!.png");
        assert_eq!(encode_path("caf\u{e9}[x].png"), "caf%C3%A9%5Bx%5D.png");
        assert_eq!(encode_path("100%.png"), "100%25.png");
    }

    #[test]
    fn iteration_follows_first_seen_order() {
        let mut manifest = ImageManifest::new();
        manifest.assign("https://ex.com/b.png", &options(), false);
        manifest.assign("https://ex.com/a.png", &options(), false);
        let sources: Vec<_> = manifest.iter().map(|(src, _)| src).collect();
        assert_eq!(sources, vec!["https://ex.com/b.png", "https://ex.com/a.png"]);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        proptest! {
            #[test]
            fn colliding_sources_get_sequential_suffixes(
                count in 1usize..12,
                stem in "[a-z]{1,8}",
                ext in "(png|jpg|gif)",
            ) {
                let mut manifest = ImageManifest::new();
                let names: Vec<String> = (0..count)
                    .map(|i| manifest.assign(&format!("https://host{i}.com/{stem}.{ext}"), &options(), false))
                    .collect();

                prop_assert_eq!(&names[0], &format!("img/{stem}.{ext}"));
                for (i, name) in names.iter().enumerate().skip(1) {
                    prop_assert_eq!(name, &format!("img/{stem}.{i}.{ext}"));
                }
                let distinct: HashSet<_> = names.iter().collect();
                prop_assert_eq!(distinct.len(), count);
            }

            #[test]
            fn filenames_stay_distinct_for_arbitrary_sources(
                sources in proptest::collection::vec("[a-c/.?]{0,8}", 1..20),
            ) {
                let mut manifest = ImageManifest::new();
                for src in &sources {
                    manifest.assign(src, &options(), false);
                }
                let names: Vec<_> = manifest.iter().map(|(_, e)| e.filename.clone()).collect();
                let distinct: HashSet<_> = names.iter().collect();
                prop_assert_eq!(distinct.len(), names.len());
            }
        }
    }
}
