//! Archive download over HTTP

use std::path::{Path, PathBuf};

use reqwest::header::AUTHORIZATION;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::USER_AGENT;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {status} downloading {url}")]
    Http { status: u16, url: String },

    #[error("Failed to write download: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DownloadError::Http { status, .. } => Some(*status),
            DownloadError::Network(e) => e.status().map(|s| s.as_u16()),
            DownloadError::Io(_) => None,
        }
    }
}

/// Trait for fetching a remote archive onto local disk
#[async_trait::async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` and return the path of the local copy
    async fn download(&self, url: &str, auth: Option<&str>) -> Result<PathBuf, DownloadError>;
}

/// Downloader writing into a scratch directory
pub struct HttpDownloader {
    client: reqwest::Client,
    dest_dir: PathBuf,
}

impl HttpDownloader {
    pub fn new(dest_dir: &Path) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            dest_dir: dest_dir.to_path_buf(),
        })
    }
}

#[async_trait::async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, auth: Option<&str>) -> Result<PathBuf, DownloadError> {
        let mut request = self.client.get(url);
        if let Some(auth) = auth {
            request = request.header(AUTHORIZATION, auth);
        }

        let mut response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        tokio::fs::create_dir_all(&self.dest_dir).await?;
        let dest = self.dest_dir.join(file_name_from_url(url));
        debug!("Downloading {} to {:?}", url, dest);

        let mut file = tokio::fs::File::create(&dest).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(dest)
    }
}

/// Last path segment of a URL, without query or fragment
fn file_name_from_url(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name,
        _ => "download",
    }
}
