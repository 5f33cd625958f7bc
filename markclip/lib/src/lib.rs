//! Web-article clipping to Markdown.
//!
//! Turns a readable article (HTML content plus page metadata) into a
//! Markdown document and a manifest of the images it references, driven by
//! a serializable option set.
//!
//! ## Core Types
//!
//! - [`Article`] - Content, base URI, title, keywords, math and metadata
//! - [`Options`] - Every rendering, naming and download setting
//! - [`Conversion`] - The Markdown text and its [`ImageManifest`]
//!
//! ## Pipeline
//!
//! - [`convert_article`] - Template expansion, rendering, normalization and
//!   the optional eager image fetch
//! - [`Clipper`] - Conversion plus naming, saving and copying through
//!   injected capabilities
//!
//! ## Building Blocks
//!
//! - [`sanitize_filename`] / [`sanitize_path`] - Safe file names
//! - [`template`] - `{placeholder}` expansion
//! - [`asset`] - Image naming, collision handling and pre-download
//! - [`render`] - The rule-driven HTML → Markdown renderer
//!
//! ## Capabilities
//!
//! - [`AssetFetcher`] ([`HttpFetcher`]), [`SettingsStore`] ([`FileSettings`],
//!   [`MemorySettings`]), [`Downloader`] ([`FsDownloader`]) and [`Clipboard`]
//!   ([`MemoryClipboard`])
//!
//! ## Examples
//!
//! ```
//! use markclip_lib::{Article, Options, pipeline::render_article, pipeline::prepare_options};
//!
//! let article = Article::new(
//!     r#"<p>See <a href="/x">this</a> and <img src="pic.png"></p>"#,
//!     "https://ex.com/a/",
//! );
//! let options = prepare_options(Options::default(), &article);
//! let conversion = render_article(&article, &options);
//!
//! assert_eq!(
//!     conversion.markdown,
//!     "See [this](https://ex.com/x) and ![](https://ex.com/a/pic.png)"
//! );
//! ```

mod article;
pub mod asset;
mod capability;
mod clipper;
pub mod dom;
mod error;
mod options;
pub mod pipeline;
pub mod render;
mod sanitize;
pub mod template;

pub use article::{Article, MathInfo};
pub use asset::{FetchedAsset, ImageEntry, ImageManifest};
pub use capability::{
    AssetFetcher, BoxFuture, CONFIG_ENV, Clipboard, Downloader, FileSettings, FsDownloader, HttpFetcher,
    MemoryClipboard, MemorySettings, SettingsStore,
};
pub use clipper::Clipper;
pub use error::{ClipError, FetchError, Result};
pub use options::{
    CodeBlockStyle, DEFAULT_FRONTMATTER, DownloadMode, HeadingStyle, ImageRefStyle, ImageStyle,
    LinkReferenceStyle, LinkStyle, Options,
};
pub use pipeline::{Conversion, convert_article};
pub use sanitize::{sanitize_filename, sanitize_path};
