//! Fetching the raw dataset into local storage
//!
//! The [`SourceFetcher`] trait decouples the pipeline from the transport:
//! [`HttpFetcher`] downloads from the public mirror, [`DirectoryFetcher`]
//! copies from a local mirror directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::config::SourceConfig;
use super::error::SourceError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Copies one named source file to a destination path
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch `filename` into `dest`, returning the number of bytes written
    async fn fetch(&self, filename: &str, dest: &Path) -> Result<u64, SourceError>;
}

/// Downloads source files over HTTP
pub struct HttpFetcher {
    client: reqwest::Client,
    config: SourceConfig,
}

impl HttpFetcher {
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SourceError::Http {
                file: String::new(),
                source: e,
            })?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, filename: &str, dest: &Path) -> Result<u64, SourceError> {
        let url = self.config.url_for(filename);
        debug!(%url, "Downloading {}", filename);

        let http_err = |e| SourceError::Http {
            file: filename.to_string(),
            source: e,
        };

        let mut response = self.client.get(&url).send().await.map_err(http_err)?;
        if !response.status().is_success() {
            return Err(SourceError::Status {
                file: filename.to_string(),
                status: response.status().as_u16(),
            });
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| SourceError::io(dest, e))?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(http_err)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| SourceError::io(dest, e))?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(|e| SourceError::io(dest, e))?;

        Ok(written)
    }
}

/// Copies source files from a local directory holding the same file names
pub struct DirectoryFetcher {
    root: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl SourceFetcher for DirectoryFetcher {
    async fn fetch(&self, filename: &str, dest: &Path) -> Result<u64, SourceError> {
        let src = self.root.join(filename);
        if !tokio::fs::try_exists(&src).await.unwrap_or(false) {
            return Err(SourceError::MissingFile(src));
        }
        debug!(src = %src.display(), "Copying {}", filename);
        tokio::fs::copy(&src, dest)
            .await
            .map_err(|e| SourceError::io(&src, e))
    }
}

/// Fetches a fixed list of files into the raw directory, one after another
pub struct Downloader {
    fetcher: Box<dyn SourceFetcher>,
    files: Vec<String>,
}

impl Downloader {
    pub fn new(fetcher: Box<dyn SourceFetcher>, files: &[&str]) -> Self {
        Self {
            fetcher,
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Fetch every file into `raw_dir`. The first failure aborts.
    pub async fn fetch_all(&self, raw_dir: &Path) -> Result<u64, SourceError> {
        info!("Downloading {} files", self.files.len());
        let mut total = 0;
        for file in &self.files {
            let bytes = self.fetcher.fetch(file, &raw_dir.join(file)).await?;
            debug!(bytes, "Fetched {}", file);
            total += bytes;
        }
        Ok(total)
    }
}
