// Remote snapshot sources.
// Fetches the published document body; any transport or status failure
// surfaces as a SourceError.

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::debug;

/// The published snapshot document URL.
pub const SNAPSHOT_URL: &str = "https://ayfri.com/github.json";

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status: {0}")]
    Status(StatusCode),
}

/// Fetch capability for the published snapshot document.
#[allow(async_fn_in_trait)]
pub trait SnapshotSource {
    /// Retrieve the raw document text.
    async fn fetch(&self) -> Result<String, SourceError>;
}

/// HTTP source over the fixed public URL. No authentication; timeouts are
/// whatever the client defaults to.
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    url: String,
}

impl HttpSource {
    pub fn new() -> Self {
        Self::with_url(SNAPSHOT_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
        }
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotSource for HttpSource {
    async fn fetch(&self) -> Result<String, SourceError> {
        debug!(url = %self.url, "fetching snapshot document");
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status));
        }

        Ok(response.text().await?)
    }
}
