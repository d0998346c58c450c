//! Release manifest and resolution types

use serde::{Deserialize, Serialize};

/// One downloadable artifact of a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    /// Target platform (`linux`, `darwin`, `win32`)
    pub platform: String,
    /// Optional OS version range the artifact was built for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_version: Option<String>,
    /// Target architecture (`x64`, `arm64`, ...)
    pub arch: String,
    pub download_url: String,
}

/// One published release in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRelease {
    pub version: String,
    pub stable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_url: Option<String>,
    #[serde(default)]
    pub files: Vec<ReleaseFile>,
}

/// Where the resolved archive comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationType {
    /// Direct download from the vendor's distribution site
    Dist,
    /// Release listed in the versions manifest
    Manifest,
}

impl InstallationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallationType::Dist => "dist",
            InstallationType::Manifest => "manifest",
        }
    }
}

/// Download metadata for a resolved release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallInfo {
    pub kind: InstallationType,
    /// Version string exactly as published in the manifest
    pub resolved_version: String,
    pub download_url: String,
    pub file_name: String,
}
