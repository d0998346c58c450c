//! GitHub repository manifest source
//!
//! Reads `versions-manifest.json` from a repository branch through the Git
//! trees API, then downloads the blob in raw form.

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{DEFAULT_GITHUB_API_URL, MANIFEST_FILE, USER_AGENT};
use crate::version::error::ManifestError;
use crate::version::registry::ManifestSource;
use crate::version::types::ToolRelease;

/// Media type asking GitHub for the raw blob content
const RAW_MEDIA_TYPE: &str = "application/vnd.github.VERSION.raw";

/// Response from the Git trees API
#[derive(Debug, Deserialize)]
struct Tree {
    tree: Vec<TreeItem>,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
    url: String,
}

/// Manifest source backed by the GitHub API
pub struct GitHubManifestSource {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubManifestSource {
    /// Creates a source talking to a custom API base URL
    pub fn new(base_url: &str) -> Result<Self, ManifestError> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Creates a source talking to api.github.com
    pub fn github() -> Result<Self, ManifestError> {
        Self::new(DEFAULT_GITHUB_API_URL)
    }

    async fn get(
        &self,
        url: &str,
        accept: &str,
        auth: Option<&str>,
    ) -> Result<reqwest::Response, ManifestError> {
        let mut request = self.client.get(url).header(ACCEPT, accept);
        if let Some(auth) = auth {
            request = request.header(AUTHORIZATION, auth);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(ManifestError::RateLimited {
                status: status.as_u16(),
                retry_after_secs: retry_after,
            });
        }

        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(ManifestError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl ManifestSource for GitHubManifestSource {
    async fn fetch_manifest(
        &self,
        owner: &str,
        repo: &str,
        auth: Option<&str>,
        branch: &str,
    ) -> Result<Vec<ToolRelease>, ManifestError> {
        let tree_url = format!(
            "{}/repos/{}/{}/git/trees/{}",
            self.base_url, owner, repo, branch
        );

        let tree: Tree = self
            .get(&tree_url, "application/vnd.github+json", auth)
            .await?
            .json()
            .await
            .map_err(|e| {
                warn!("Failed to parse tree response: {}", e);
                ManifestError::InvalidResponse(e.to_string())
            })?;

        let Some(item) = tree.tree.into_iter().find(|item| item.path == MANIFEST_FILE) else {
            return Err(ManifestError::ManifestNotFound {
                file: MANIFEST_FILE.to_string(),
                owner: owner.to_string(),
                repo: repo.to_string(),
                branch: branch.to_string(),
            });
        };

        debug!("Downloading manifest from {}", item.url);
        let body = self.get(&item.url, RAW_MEDIA_TYPE, auth).await?.text().await?;
        let body = body.strip_prefix('\u{feff}').unwrap_or(&body);

        let releases: Vec<ToolRelease> = serde_json::from_str(body).map_err(|e| {
            warn!("Failed to parse versions manifest: {}", e);
            ManifestError::InvalidResponse(e.to_string())
        })?;

        debug!("Manifest lists {} releases", releases.len());
        Ok(releases)
    }
}
