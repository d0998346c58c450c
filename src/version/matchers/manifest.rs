//! Versions-manifest release matcher
//!
//! Selects the highest release that satisfies a node-style range and ships an
//! artifact for the host platform. Platform filtering happens here, so the
//! resolver can take the first file of the returned release unconditionally.

use semver::Version;
use tracing::debug;

use crate::system::Platform;
use crate::version::matcher::ReleaseMatcher;
use crate::version::range::VersionRequirement;
use crate::version::semver::parse_version;
use crate::version::types::{ReleaseFile, ToolRelease};

pub struct ManifestMatcher {
    platform: Platform,
}

impl ManifestMatcher {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    fn is_usable(&self, file: &ReleaseFile) -> bool {
        if file.platform != self.platform.os || file.arch != self.platform.arch {
            return false;
        }

        // Without a known OS version the constraint cannot be checked
        match (&file.platform_version, &self.platform.os_version) {
            (Some(required), Some(actual)) => {
                match (VersionRequirement::parse(required), parse_os_version(actual)) {
                    (Some(requirement), Some(actual)) => requirement.satisfies(&actual),
                    _ => false,
                }
            }
            _ => true,
        }
    }
}

impl ReleaseMatcher for ManifestMatcher {
    fn find_best_match(
        &self,
        version_spec: &str,
        stable_only: bool,
        releases: &[ToolRelease],
    ) -> Option<ToolRelease> {
        let requirement = VersionRequirement::parse(version_spec)?;

        let mut best: Option<(Version, ToolRelease)> = None;
        for release in releases {
            if stable_only && !release.stable {
                continue;
            }
            let Some(version) = parse_version(&release.version) else {
                debug!("Skipping unparseable manifest version {}", release.version);
                continue;
            };
            if !requirement.satisfies(&version) {
                continue;
            }

            let files: Vec<ReleaseFile> = release
                .files
                .iter()
                .filter(|file| self.is_usable(file))
                .cloned()
                .collect();
            if files.is_empty() {
                debug!(
                    "Release {} has no artifact for {}",
                    release.version, self.platform
                );
                continue;
            }

            // Earlier entries win ties
            if best.as_ref().is_some_and(|(current, _)| *current >= version) {
                continue;
            }
            best = Some((
                version,
                ToolRelease {
                    files,
                    ..release.clone()
                },
            ));
        }

        best.map(|(_, release)| release)
    }
}

/// OS versions such as `22.04` or `14` are padded to three components
fn parse_os_version(version: &str) -> Option<Version> {
    let mut parts = version.trim().split('.').map(|part| part.parse::<u64>().ok());
    let major = parts.next().flatten()?;
    let minor = parts.next().unwrap_or(Some(0))?;
    let patch = parts.next().unwrap_or(Some(0))?;
    Some(Version::new(major, minor, patch))
}
