//! Versioned tool cache on local disk
//!
//! Layout: `{root}/{tool}/{version}/{arch}`, with a sibling
//! `{arch}.complete` marker written once the copy has finished. Entries
//! without a marker are treated as absent.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::version::range::VersionRequirement;
use crate::version::semver::{clean, parse_version};

#[derive(Debug, Error)]
pub enum ToolCacheError {
    #[error("Tool cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Trait for locating and storing installed tool trees
#[cfg_attr(test, mockall::automock)]
pub trait ToolCache: Send + Sync {
    /// Directory of a cached `tool` matching `version_spec` for `arch`.
    ///
    /// A full version is looked up exactly. Anything else is treated as a
    /// range and the highest satisfying cached version is returned.
    fn find(&self, tool: &str, version_spec: &str, arch: &str) -> Option<PathBuf>;

    /// Copy `source_dir` into the cache and return the cached directory
    fn cache_dir(
        &self,
        source_dir: &Path,
        tool: &str,
        version: &str,
        arch: &str,
    ) -> Result<PathBuf, ToolCacheError>;
}

/// Tool cache rooted at a directory, usually `RUNNER_TOOL_CACHE`
pub struct DirToolCache {
    root: PathBuf,
}

impl DirToolCache {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn entry_dir(&self, tool: &str, version: &str, arch: &str) -> PathBuf {
        self.root.join(tool).join(version).join(arch)
    }

    fn is_complete(&self, tool: &str, version: &str, arch: &str) -> bool {
        marker_path(&self.entry_dir(tool, version, arch)).is_file()
    }

    /// Highest cached version of `tool` satisfying `requirement`
    fn find_in_range(&self, tool: &str, requirement: &VersionRequirement, arch: &str) -> Option<String> {
        let entries = fs::read_dir(self.root.join(tool)).ok()?;

        entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter_map(|name| parse_version(&name).map(|version| (name, version)))
            .filter(|(name, version)| {
                requirement.satisfies(version) && self.is_complete(tool, name, arch)
            })
            .max_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(name, _)| name)
    }
}

impl ToolCache for DirToolCache {
    fn find(&self, tool: &str, version_spec: &str, arch: &str) -> Option<PathBuf> {
        let version = match clean(version_spec) {
            Some(exact) => exact,
            None => {
                let requirement = VersionRequirement::parse(version_spec)?;
                self.find_in_range(tool, &requirement, arch)?
            }
        };

        if !self.is_complete(tool, &version, arch) {
            debug!("{} {} ({}) not in tool cache", tool, version, arch);
            return None;
        }

        Some(self.entry_dir(tool, &version, arch))
    }

    fn cache_dir(
        &self,
        source_dir: &Path,
        tool: &str,
        version: &str,
        arch: &str,
    ) -> Result<PathBuf, ToolCacheError> {
        let version = clean(version).unwrap_or_else(|| version.to_string());
        let dest = self.entry_dir(tool, &version, arch);
        let marker = marker_path(&dest);

        if marker.exists() {
            fs::remove_file(&marker)?;
        }
        if dest.exists() {
            fs::remove_dir_all(&dest)?;
        }

        debug!("Caching {:?} to {:?}", source_dir, dest);
        copy_tree(source_dir, &dest)?;
        fs::write(&marker, "")?;

        Ok(dest)
    }
}

fn marker_path(entry_dir: &Path) -> PathBuf {
    let mut marker = entry_dir.as_os_str().to_owned();
    marker.push(".complete");
    PathBuf::from(marker)
}

/// Recursively copy `source` to `dest`, creating `dest` itself
fn copy_tree(source: &Path, dest: &Path) -> Result<(), ToolCacheError> {
    fs::create_dir_all(dest)?;

    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|source_err| ToolCacheError::Walk {
            path: source.to_path_buf(),
            source: source_err,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn tool_tree(dir: &Path) -> PathBuf {
        let source = dir.join("extracted");
        fs::create_dir_all(source.join("bin")).unwrap();
        fs::write(source.join("bin/tor"), "tor binary").unwrap();
        fs::create_dir_all(source.join("share/tor")).unwrap();
        fs::write(source.join("share/tor/geoip"), "geoip").unwrap();
        source
    }

    #[test]
    fn cache_dir_copies_tree_and_writes_marker() {
        let temp_dir = TempDir::new().unwrap();
        let source = tool_tree(temp_dir.path());
        let cache = DirToolCache::new(&temp_dir.path().join("cache"));

        let cached = cache.cache_dir(&source, "tor", "0.4.5-rc7", "x64").unwrap();

        assert_eq!(cached, temp_dir.path().join("cache/tor/0.4.5-rc7/x64"));
        assert_eq!(fs::read_to_string(cached.join("bin/tor")).unwrap(), "tor binary");
        assert_eq!(fs::read_to_string(cached.join("share/tor/geoip")).unwrap(), "geoip");
        assert!(temp_dir.path().join("cache/tor/0.4.5-rc7/x64.complete").is_file());
    }

    #[test]
    fn cache_dir_cleans_version_key() {
        let temp_dir = TempDir::new().unwrap();
        let source = tool_tree(temp_dir.path());
        let cache = DirToolCache::new(&temp_dir.path().join("cache"));

        let cached = cache.cache_dir(&source, "tor", "v0.4.6", "x64").unwrap();

        assert_eq!(cached, temp_dir.path().join("cache/tor/0.4.6/x64"));
    }

    #[test]
    fn cache_dir_replaces_previous_entry() {
        let temp_dir = TempDir::new().unwrap();
        let source = tool_tree(temp_dir.path());
        let cache = DirToolCache::new(&temp_dir.path().join("cache"));
        let stale = temp_dir.path().join("cache/tor/0.4.6/x64/stale.txt");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        cache.cache_dir(&source, "tor", "0.4.6", "x64").unwrap();

        assert!(!stale.exists());
        assert!(temp_dir.path().join("cache/tor/0.4.6/x64/bin/tor").is_file());
    }

    #[test]
    fn find_returns_exact_cached_version() {
        let temp_dir = TempDir::new().unwrap();
        let source = tool_tree(temp_dir.path());
        let cache = DirToolCache::new(&temp_dir.path().join("cache"));
        let cached = cache.cache_dir(&source, "tor", "0.4.5-rc7", "x64").unwrap();

        assert_eq!(cache.find("tor", "0.4.5-rc7", "x64"), Some(cached));
        assert_eq!(cache.find("tor", "0.4.5-rc7", "arm64"), None);
        assert_eq!(cache.find("tor", "0.4.6", "x64"), None);
    }

    #[test]
    fn find_ignores_entries_without_marker() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("tor/0.4.6/x64/bin")).unwrap();
        let cache = DirToolCache::new(temp_dir.path());

        assert_eq!(cache.find("tor", "0.4.6", "x64"), None);
        assert_eq!(cache.find("tor", "0.4", "x64"), None);
    }

    #[rstest]
    #[case("0.4", Some("0.4.8"))]
    #[case("0.x.0", Some("0.4.8"))]
    #[case("~0", Some("0.4.8"))]
    #[case("^0", Some("0.4.8"))]
    #[case("0.4.4 - 0.4.6", Some("0.4.6"))]
    #[case(">0.4", None)]
    #[case("~0.4.5", Some("0.4.8"))]
    #[case(">=0.4.5 <0.4.6", Some("0.4.5"))]
    #[case(">=0.4.7", Some("0.4.8"))]
    #[case("0.3", None)]
    #[case("latest", None)]
    fn find_picks_highest_version_in_range(#[case] spec: &str, #[case] expected: Option<&str>) {
        let temp_dir = TempDir::new().unwrap();
        let source = tool_tree(temp_dir.path());
        let root = temp_dir.path().join("cache");
        let cache = DirToolCache::new(&root);
        for version in ["0.4.5", "0.4.6", "0.4.8"] {
            cache.cache_dir(&source, "tor", version, "x64").unwrap();
        }
        // incomplete entry must not win the range
        fs::create_dir_all(root.join("tor/0.4.9/x64")).unwrap();

        let found = cache.find("tor", spec, "x64");

        assert_eq!(found, expected.map(|v| root.join("tor").join(v).join("x64")));
    }
}
