//! Network transport for remote artifacts.

use std::io::Read;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;

/// Default download size limit (512 MB).
pub const MAX_DOWNLOAD_SIZE: u64 = 512 * 1024 * 1024;

/// Why a fetch did not produce bytes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The server answered, but has no such artifact.
    #[error("not found")]
    NotFound,

    /// Transport failure or an unexpected status.
    #[error("{0}")]
    Failed(String),

    #[error("download of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },
}

/// Fetches the bytes behind a URL.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Blocking HTTP(S) fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_size: u64,
}

impl HttpFetcher {
    /// Build a fetcher with redirects, a request timeout and a size limit.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("modhost/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| FetchError::Failed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            client,
            max_size: MAX_DOWNLOAD_SIZE,
        })
    }

    pub fn with_max_size(mut self, max_size: u64) -> Self {
        self.max_size = max_size;
        self
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        tracing::debug!("Fetching {url}");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Failed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Failed(format!("server returned {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_size {
                return Err(FetchError::TooLarge {
                    size: len,
                    limit: self.max_size,
                });
            }
        }

        let mut bytes = Vec::new();
        response
            .take(self.max_size.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| FetchError::Failed(format!("download error: {e}")))?;

        let size = bytes.len() as u64;
        if size > self.max_size {
            return Err(FetchError::TooLarge {
                size,
                limit: self.max_size,
            });
        }
        Ok(bytes)
    }
}
