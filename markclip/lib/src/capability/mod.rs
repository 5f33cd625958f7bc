//! Host capabilities the clipper depends on.
//!
//! Fetching bytes, persisting settings, writing files and the clipboard all
//! sit behind traits so the conversion core never touches the network or
//! the disk directly. Each trait is dyn-compatible: async methods return a
//! [`BoxFuture`].

mod fs;
mod http;
mod settings;

use std::sync::Mutex;

use crate::asset::FetchedAsset;
use crate::error::{ClipError, FetchError, Result};
use crate::options::Options;

pub use fs::FsDownloader;
pub use http::HttpFetcher;
pub use settings::{CONFIG_ENV, FileSettings, MemorySettings};

/// Boxed future type for async trait methods.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches the bytes behind an image source.
pub trait AssetFetcher: Send + Sync {
    /// Retrieves `src` along with the media type it was served as.
    fn fetch<'a>(&'a self, src: &'a str) -> BoxFuture<'a, std::result::Result<FetchedAsset, FetchError>>;
}

/// Where [`Options`] live between runs.
pub trait SettingsStore: Send + Sync {
    /// Current options; defaults when nothing was stored yet.
    fn load(&self) -> BoxFuture<'_, Result<Options>>;

    fn save<'a>(&'a self, options: &'a Options) -> BoxFuture<'a, Result<()>>;

    /// Flips a boolean setting and stores the result.
    ///
    /// Returns the new value, or `None` when `key` is not a boolean setting.
    fn toggle<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<bool>>> {
        Box::pin(async move {
            let mut options = self.load().await?;
            let Some(value) = options.toggle(key) else {
                return Ok(None);
            };
            self.save(&options).await?;
            Ok(Some(value))
        })
    }
}

/// Persists clips and their images.
pub trait Downloader: Send + Sync {
    /// Writes `markdown` to the relative `path`.
    fn save_markdown<'a>(&'a self, path: &'a str, markdown: &'a str) -> BoxFuture<'a, Result<()>>;

    /// Writes an image payload to the relative `path`.
    fn save_asset<'a>(&'a self, path: &'a str, asset: &'a FetchedAsset) -> BoxFuture<'a, Result<()>>;
}

/// Receives text copied by the user.
pub trait Clipboard: Send + Sync {
    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<()>>;
}

/// Clipboard that keeps everything written to it.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent text written, if any.
    pub fn last(&self) -> Option<String> {
        self.contents
            .lock()
            .ok()
            .and_then(|contents| contents.last().cloned())
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.contents
                .lock()
                .map_err(|_| ClipError::Clipboard("clipboard lock poisoned".into()))?
                .push(text.to_string());
            Ok(())
        })
    }
}
