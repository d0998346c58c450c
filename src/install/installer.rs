//! Tor acquisition: tool cache first, then the versions manifest

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::TOOL_NAME;
use crate::install::download::{DownloadError, Downloader};
use crate::install::extract::{ArchiveExtractor, ExtractionError};
use crate::install::tool_cache::{ToolCache, ToolCacheError};
use crate::system::Platform;
use crate::version::error::ManifestError;
use crate::version::normalize::normalize_version;
use crate::version::resolver::ManifestResolver;
use crate::version::types::InstallInfo;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("Unable to find tor version '{version}' for platform {platform}")]
    NotFound { version: String, platform: String },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Extract(#[from] ExtractionError),

    #[error(transparent)]
    Cache(#[from] ToolCacheError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl InstallError {
    /// HTTP status of a failed request when it signals rate limiting
    pub fn rate_limit_status(&self) -> Option<u16> {
        let status = match self {
            InstallError::Manifest(e) => e.status_code(),
            InstallError::Download(e) => e.status_code(),
            _ => None,
        }?;
        matches!(status, 403 | 429).then_some(status)
    }
}

/// Installs tor into the tool cache for one platform
pub struct Installer {
    resolver: ManifestResolver,
    downloader: Arc<dyn Downloader>,
    extractor: Arc<dyn ArchiveExtractor>,
    cache: Arc<dyn ToolCache>,
    platform: Platform,
    temp_dir: PathBuf,
}

impl Installer {
    pub fn new(
        resolver: ManifestResolver,
        downloader: Arc<dyn Downloader>,
        extractor: Arc<dyn ArchiveExtractor>,
        cache: Arc<dyn ToolCache>,
        platform: Platform,
        temp_dir: &Path,
    ) -> Self {
        Self {
            resolver,
            downloader,
            extractor,
            cache,
            platform,
            temp_dir: temp_dir.to_path_buf(),
        }
    }

    /// Returns the directory holding an installed tor matching `version_spec`
    ///
    /// Any failure while going through the manifest is logged and treated as
    /// a miss; a miss ends in [`InstallError::NotFound`].
    pub async fn get_tor(
        &self,
        version_spec: &str,
        stable_only: bool,
        auth: Option<&str>,
    ) -> Result<PathBuf, InstallError> {
        if let Some(tool_path) = self.cache.find(TOOL_NAME, version_spec, &self.platform.arch) {
            info!("Found in cache @ {}", tool_path.display());
            return Ok(tool_path);
        }
        info!("Attempting to download {}...", version_spec);

        match self.install_from_manifest(version_spec, stable_only, auth).await {
            Ok(Some(cached_dir)) => return Ok(cached_dir),
            Ok(None) => {
                info!("Not found in manifest. Falling back to download directly from Tor");
            }
            Err(e) => {
                match e.rate_limit_status() {
                    Some(status) => info!(
                        "Received HTTP status code {}.  This usually indicates the rate limit has been exceeded",
                        status
                    ),
                    None => info!("{}", e),
                }
                debug!("Manifest install failed: {:?}", e);
                info!("Falling back to download directly from Tor");
            }
        }

        Err(InstallError::NotFound {
            version: version_spec.to_string(),
            platform: self.platform.to_string(),
        })
    }

    async fn install_from_manifest(
        &self,
        version_spec: &str,
        stable_only: bool,
        auth: Option<&str>,
    ) -> Result<Option<PathBuf>, InstallError> {
        let Some(info) = self.resolver.resolve(version_spec, stable_only, auth).await? else {
            return Ok(None);
        };
        self.install_version(&info, auth).await.map(Some)
    }

    async fn install_version(
        &self,
        info: &InstallInfo,
        auth: Option<&str>,
    ) -> Result<PathBuf, InstallError> {
        info!("Acquiring {} from {}", info.resolved_version, info.download_url);
        let archive = self.downloader.download(&info.download_url, auth).await?;

        info!("Extracting Tor...");
        let extractor = Arc::clone(&self.extractor);
        let dest = self.temp_dir.join(extract_dir_name(&info.file_name));
        let ext_path =
            tokio::task::spawn_blocking(move || extractor.extract(&archive, &dest)).await??;
        info!("Successfully extracted tor to {}", ext_path.display());

        info!("Adding to the cache ...");
        let cache = Arc::clone(&self.cache);
        let version = normalize_version(&info.resolved_version);
        let arch = self.platform.arch.clone();
        let cached_dir = tokio::task::spawn_blocking(move || {
            cache.cache_dir(&ext_path, TOOL_NAME, &version, &arch)
        })
        .await??;
        info!("Successfully cached tor to {}", cached_dir.display());

        Ok(cached_dir)
    }
}

/// Scratch directory name for an archive, its file name without extension
fn extract_dir_name(file_name: &str) -> String {
    let stem = [".tar.gz", ".tgz", ".tar.xz", ".tar"]
        .iter()
        .find_map(|ext| file_name.strip_suffix(ext))
        .unwrap_or(file_name);
    if stem.is_empty() {
        TOOL_NAME.to_string()
    } else {
        stem.to_string()
    }
}
