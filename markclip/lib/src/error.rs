//! Error types for the markclip library.

use thiserror::Error;

/// Errors raised while fetching a single asset.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// The source is not a valid URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The URL scheme cannot be fetched.
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// A `data:` URI could not be decoded.
    #[error("malformed data URI")]
    InvalidDataUri,
}

/// Errors that can occur while converting, fetching or persisting a clip.
#[derive(Debug, Error)]
pub enum ClipError {
    /// One asset of an eager fetch batch failed; the whole batch is abandoned.
    #[error("failed to fetch {src}: {source}")]
    Fetch {
        /// The manifest source that failed.
        src: String,
        /// The underlying fetch failure.
        #[source]
        source: FetchError,
    },

    /// Settings could not be loaded or stored.
    #[error("settings error: {0}")]
    Settings(String),

    /// The clipboard rejected the text.
    #[error("clipboard error: {0}")]
    Clipboard(String),

    /// A filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML settings file could not be parsed or written.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON settings file could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A generated path tried to leave the output directory.
    #[error("refusing to write outside the output directory: {0}")]
    UnsafePath(String),
}

/// Convenience Result type for markclip operations.
pub type Result<T> = std::result::Result<T, ClipError>;
