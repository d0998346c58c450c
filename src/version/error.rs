use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limited (HTTP {status}): retry after {retry_after_secs:?} seconds")]
    RateLimited {
        status: u16,
        retry_after_secs: Option<u64>,
    },

    #[error("Unexpected HTTP status {status} from {url}")]
    Http { status: u16, url: String },

    #[error("{file} not found in {owner}/{repo}@{branch}")]
    ManifestNotFound {
        file: String,
        owner: String,
        repo: String,
        branch: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ManifestError {
    /// HTTP status code behind the error, if the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ManifestError::RateLimited { status, .. } | ManifestError::Http { status, .. } => {
                Some(*status)
            }
            ManifestError::Network(e) => e.status().map(|s| s.as_u16()),
            ManifestError::ManifestNotFound { .. } | ManifestError::InvalidResponse(_) => None,
        }
    }
}
