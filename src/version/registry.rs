//! Source trait for fetching the release manifest

use crate::version::error::ManifestError;
use crate::version::types::ToolRelease;

/// Trait for fetching a versions manifest from a remote repository
#[async_trait::async_trait]
pub trait ManifestSource: Send + Sync {
    /// Fetches every release listed in the manifest
    ///
    /// # Arguments
    /// * `owner` - Organization or user owning the repository
    /// * `repo` - Repository holding the manifest
    /// * `auth` - Optional `Authorization` header value
    /// * `branch` - Git ref the manifest is read from
    ///
    /// # Returns
    /// * `Ok(Vec<ToolRelease>)` - Releases in manifest order
    /// * `Err(ManifestError)` - If the fetch fails
    async fn fetch_manifest(
        &self,
        owner: &str,
        repo: &str,
        auth: Option<&str>,
        branch: &str,
    ) -> Result<Vec<ToolRelease>, ManifestError>;
}
