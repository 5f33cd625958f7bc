use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use super::{BoxFuture, Downloader};
use crate::asset::FetchedAsset;
use crate::error::{ClipError, Result};

/// Writes clips below a root directory.
///
/// Relative paths are joined to the root; absolute paths and `..`
/// components are refused.
#[derive(Debug, Clone)]
pub struct FsDownloader {
    root: PathBuf,
}

impl FsDownloader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, path: &str) -> Result<PathBuf> {
        let relative = Path::new(path);
        let safe = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if path.is_empty() || !safe {
            return Err(ClipError::UnsafePath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    #[instrument(name = "write_file", skip(self, bytes), fields(bytes = bytes.len()))]
    async fn write(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let target = self.target(path)?;
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;
        debug!(path = %target.display(), "wrote file");
        Ok(())
    }
}

impl Downloader for FsDownloader {
    fn save_markdown<'a>(&'a self, path: &'a str, markdown: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.write(path, markdown.as_bytes()))
    }

    fn save_asset<'a>(&'a self, path: &'a str, asset: &'a FetchedAsset) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.write(path, &asset.bytes))
    }
}
