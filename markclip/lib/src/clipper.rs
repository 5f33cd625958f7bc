//! The clipper: conversions plus the host capabilities around them.

use tracing::{debug, info, instrument};

use crate::article::Article;
use crate::capability::{AssetFetcher, Clipboard, Downloader, SettingsStore};
use crate::error::{ClipError, Result};
use crate::options::Options;
use crate::pipeline::{self, Conversion};

/// Converts, names, saves and copies clips using injected capabilities.
///
/// Settings are read from the store on every call, so changes made through
/// [`SettingsStore::save`] or [`SettingsStore::toggle`] apply to the next
/// clip.
pub struct Clipper<S, F> {
    settings: S,
    fetcher: F,
}

impl<S, F> Clipper<S, F>
where
    S: SettingsStore,
    F: AssetFetcher,
{
    pub fn new(settings: S, fetcher: F) -> Self {
        Self { settings, fetcher }
    }

    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// The current options.
    pub async fn options(&self) -> Result<Options> {
        self.settings.load().await
    }

    /// Converts `article` to Markdown.
    ///
    /// `download_images` overrides the stored setting for this call only.
    pub async fn convert(&self, article: &Article, download_images: Option<bool>) -> Result<Conversion> {
        let options = self.options().await?;
        pipeline::convert_article(article, options, download_images, &self.fetcher).await
    }

    /// File name for the clip, from the title template.
    pub async fn format_title(&self, article: &Article) -> Result<String> {
        let options = self.options().await?;
        Ok(pipeline::format_title(article, &options))
    }

    /// Folder the clip is saved under; empty unless one is configured.
    pub async fn format_clips_folder(&self, article: &Article) -> Result<String> {
        let options = self.options().await?;
        Ok(pipeline::format_clips_folder(article, &options))
    }

    /// `[title](baseURI)` for one article.
    pub async fn markdown_link(&self, article: &Article) -> Result<String> {
        let title = self.format_title(article).await?;
        Ok(format!("[{title}]({})", article.base_uri))
    }

    /// One bullet link per article, newline separated.
    pub async fn link_list(&self, articles: &[Article]) -> Result<String> {
        let options = self.options().await?;
        let links: Vec<String> = articles
            .iter()
            .map(|article| {
                format!(
                    "{} [{}]({})",
                    options.bullet_list_marker,
                    pipeline::format_title(article, &options),
                    article.base_uri
                )
            })
            .collect();
        Ok(links.join("\n"))
    }

    /// Writes the clip as `<folder><title>.md` and its images next to it.
    ///
    /// Image paths are relative to the Markdown file's directory. Images
    /// fetched during conversion are written from memory; the rest are
    /// fetched now. Images go first, so a failed image leaves no Markdown
    /// file behind.
    #[instrument(
        name = "save_clip",
        skip(self, conversion, downloader),
        fields(images = conversion.images.len())
    )]
    pub async fn save<D>(
        &self,
        conversion: Conversion,
        title: &str,
        folder: &str,
        downloader: &D,
    ) -> Result<()>
    where
        D: Downloader + ?Sized,
    {
        let mut folder = folder.to_string();
        if !folder.is_empty() && !folder.ends_with('/') {
            folder.push('/');
        }

        let title_dir = title.rfind('/').map_or("", |pos| &title[..pos]);
        let mut dest = format!("{folder}{title_dir}");
        if !dest.is_empty() && !dest.ends_with('/') {
            dest.push('/');
        }

        for (src, entry) in conversion.images {
            let path = format!("{dest}{}", entry.filename);
            let asset = match entry.payload {
                Some(asset) => asset,
                None => self
                    .fetcher
                    .fetch(&src)
                    .await
                    .map_err(|source| ClipError::Fetch { src: src.clone(), source })?,
            };
            downloader.save_asset(&path, &asset).await?;
            debug!(src = %src, path = %path, "saved image");
        }

        let markdown_path = format!("{folder}{title}.md");
        downloader
            .save_markdown(&markdown_path, &conversion.markdown)
            .await?;
        info!(path = %markdown_path, "saved clip");
        Ok(())
    }

    /// Puts `text` on the clipboard.
    pub async fn copy<C>(&self, text: &str, clipboard: &C) -> Result<()>
    where
        C: Clipboard + ?Sized,
    {
        clipboard.write_text(text).await
    }
}
