//! Catalog retrieval.
//!
//! The catalog is a static JSON document served over HTTP or read from disk.
//! The loader fetches and decodes it. Whether a decoded payload is accepted
//! (first write wins) is decided by [`MarketOverview`](crate::MarketOverview).

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{CatalogPayload, CatalogShape};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::CatalogError;

/// Where the catalog document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    Url(String),
    File(PathBuf),
}

impl CatalogLocation {
    /// `http://` and `https://` inputs are URLs; anything else is a path.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_owned())
        } else {
            Self::File(PathBuf::from(trimmed))
        }
    }
}

impl Display for CatalogLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSource {
    pub location: CatalogLocation,
    pub shape: CatalogShape,
}

impl CatalogSource {
    pub fn new(location: CatalogLocation, shape: CatalogShape) -> Self {
        Self { location, shape }
    }

    pub fn parse(input: &str, shape: CatalogShape) -> Self {
        Self::new(CatalogLocation::parse(input), shape)
    }
}

pub struct CatalogLoader {
    client: Arc<dyn HttpClient>,
    timeout_ms: u64,
}

impl CatalogLoader {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        Self {
            client,
            timeout_ms: 3_000,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub async fn fetch(&self, source: &CatalogSource) -> Result<CatalogPayload, CatalogError> {
        let body = match &source.location {
            CatalogLocation::Url(url) => self.fetch_url(url).await?,
            CatalogLocation::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|error| CatalogError::File {
                        path: path.display().to_string(),
                        source: error,
                    })?
            }
        };

        let payload = CatalogPayload::parse(&body, source.shape)?;
        debug!(
            location = %source.location,
            shape = %payload.shape(),
            records = payload.record_count(),
            "decoded exchange catalog"
        );
        Ok(payload)
    }

    async fn fetch_url(&self, url: &str) -> Result<String, CatalogError> {
        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);

        let response = self.client.execute(request).await.map_err(|error| {
            warn!(%url, %error, "exchange catalog request failed");
            CatalogError::Transport {
                message: error.message().to_owned(),
                retryable: error.retryable(),
            }
        })?;

        if !response.is_success() {
            return Err(CatalogError::Status {
                url: url.to_owned(),
                status: response.status,
            });
        }

        Ok(response.body)
    }
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()))
    }
}

impl std::fmt::Debug for CatalogLoader {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogLoader")
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}
