//! Manifest-based install resolution
//!
//! Fetches the versions manifest from its fixed location, lets the matcher
//! pick a release and turns the release's first file into download metadata.

use std::sync::Arc;

use tracing::info;

use crate::config::{MANIFEST_BRANCH, MANIFEST_OWNER, MANIFEST_REPO};
use crate::version::error::ManifestError;
use crate::version::matcher::ReleaseMatcher;
use crate::version::registry::ManifestSource;
use crate::version::types::{InstallInfo, InstallationType};

/// Groups the manifest source and matcher used to resolve a version
pub struct ManifestResolver {
    source: Arc<dyn ManifestSource>,
    matcher: Arc<dyn ReleaseMatcher>,
}

impl ManifestResolver {
    pub fn new(source: Arc<dyn ManifestSource>, matcher: Arc<dyn ReleaseMatcher>) -> Self {
        Self { source, matcher }
    }

    /// Resolve `version_spec` against a freshly fetched manifest
    ///
    /// # Returns
    /// * `Ok(Some(InstallInfo))` - A release with at least one usable file
    /// * `Ok(None)` - No release matched, or the match ships no files
    /// * `Err(ManifestError)` - The manifest could not be fetched
    pub async fn resolve(
        &self,
        version_spec: &str,
        stable_only: bool,
        auth: Option<&str>,
    ) -> Result<Option<InstallInfo>, ManifestError> {
        let releases = self
            .source
            .fetch_manifest(MANIFEST_OWNER, MANIFEST_REPO, auth, MANIFEST_BRANCH)
            .await?;

        info!("matching {}...", version_spec);
        let Some(release) = self
            .matcher
            .find_best_match(version_spec, stable_only, &releases)
        else {
            return Ok(None);
        };

        Ok(release.files.first().map(|file| InstallInfo {
            kind: InstallationType::Manifest,
            resolved_version: release.version.clone(),
            download_url: file.download_url.clone(),
            file_name: file.filename.clone(),
        }))
    }
}
