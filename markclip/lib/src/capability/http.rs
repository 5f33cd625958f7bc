use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use super::{AssetFetcher, BoxFuture};
use crate::asset::FetchedAsset;
use crate::error::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches images over HTTP(S) and decodes inline `data:` URIs.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("markclip/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    /// Uses an existing client (shared connection pool, custom proxy, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    #[instrument(name = "fetch_asset", skip(self))]
    async fn get(&self, src: &str) -> Result<FetchedAsset, FetchError> {
        let url = Url::parse(src)?;
        match url.scheme() {
            "data" => return decode_data_uri(src),
            "http" | "https" => {}
            other => return Err(FetchError::UnsupportedScheme(other.to_string())),
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;
        debug!(bytes = bytes.len(), content_type = ?content_type, "fetched asset");

        Ok(FetchedAsset::new(bytes.to_vec(), content_type))
    }
}

impl AssetFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<FetchedAsset, FetchError>> {
        Box::pin(self.get(src))
    }
}

/// Decodes `data:[<mime>][;base64],<payload>`.
fn decode_data_uri(src: &str) -> Result<FetchedAsset, FetchError> {
    let rest = src.strip_prefix("data:").ok_or(FetchError::InvalidDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(FetchError::InvalidDataUri)?;

    let (mime, base64) = match header.strip_suffix(";base64") {
        Some(mime) => (mime, true),
        None => (header, false),
    };
    let bytes = if base64 {
        STANDARD
            .decode(payload.trim())
            .map_err(|_| FetchError::InvalidDataUri)?
    } else {
        percent_decode_str(payload).collect()
    };

    let content_type = (!mime.is_empty()).then(|| mime.to_string());
    Ok(FetchedAsset::new(bytes, content_type))
}
