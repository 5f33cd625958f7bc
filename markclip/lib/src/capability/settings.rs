use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use super::{BoxFuture, SettingsStore};
use crate::error::{ClipError, Result};
use crate::options::Options;

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "MARKCLIP_CONFIG";

/// Settings kept in a YAML or JSON file.
///
/// The format follows the extension: `.json` is JSON, anything else YAML.
/// A missing file reads as the defaults; missing keys take their defaults.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$MARKCLIP_CONFIG`, else `<config dir>/markclip/options.yaml`.
    pub fn from_env() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(Self::new(path));
        }
        let dir = dirs::config_dir()
            .ok_or_else(|| ClipError::Settings("no configuration directory".to_string()))?;
        Ok(Self::new(dir.join("markclip").join("options.yaml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_json(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    async fn read(&self) -> Result<Options> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file, using defaults");
                return Ok(Options::default());
            }
            Err(err) => return Err(err.into()),
        };

        if text.trim().is_empty() {
            return Ok(Options::default());
        }
        let parsed = if self.is_json() {
            serde_json::from_str(&text).map_err(|err| err.to_string())
        } else {
            serde_yaml::from_str(&text).map_err(|err| err.to_string())
        };
        parsed.map_err(|err| ClipError::Settings(format!("{}: {err}", self.path.display())))
    }

    async fn write(&self, options: &Options) -> Result<()> {
        let text = if self.is_json() {
            serde_json::to_string_pretty(options)?
        } else {
            serde_yaml::to_string(options)?
        };
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, text).await?;
        info!(path = %self.path.display(), "saved settings");
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn load(&self) -> BoxFuture<'_, Result<Options>> {
        Box::pin(self.read())
    }

    fn save<'a>(&'a self, options: &'a Options) -> BoxFuture<'a, Result<()>> {
        Box::pin(self.write(options))
    }
}

/// Settings held in memory, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    options: Mutex<Options>,
}

impl MemorySettings {
    pub fn new(options: Options) -> Self {
        Self {
            options: Mutex::new(options),
        }
    }

    fn snapshot(&self) -> Result<Options> {
        self.options
            .lock()
            .map(|options| options.clone())
            .map_err(|_| ClipError::Settings("settings lock poisoned".to_string()))
    }

    fn replace(&self, options: &Options) -> Result<()> {
        let mut guard = self
            .options
            .lock()
            .map_err(|_| ClipError::Settings("settings lock poisoned".to_string()))?;
        *guard = options.clone();
        Ok(())
    }
}

impl SettingsStore for MemorySettings {
    fn load(&self) -> BoxFuture<'_, Result<Options>> {
        let snapshot = self.snapshot();
        Box::pin(async move { snapshot })
    }

    fn save<'a>(&'a self, options: &'a Options) -> BoxFuture<'a, Result<()>> {
        let stored = self.replace(options);
        Box::pin(async move { stored })
    }
}
