//! Release matching abstraction

#[cfg(test)]
use mockall::automock;

use crate::version::types::ToolRelease;

/// Trait for picking the release that satisfies a version specification
#[cfg_attr(test, automock)]
pub trait ReleaseMatcher: Send + Sync {
    /// Find the best release for `version_spec` in `releases`
    ///
    /// # Arguments
    /// * `version_spec` - A version or range (e.g., "0.4.5-rc7", "^0.4")
    /// * `stable_only` - Skip releases not flagged as stable
    /// * `releases` - The fetched manifest
    ///
    /// # Returns
    /// The matching release, its file list narrowed to artifacts usable on
    /// the host, or None when nothing matches
    fn find_best_match(
        &self,
        version_spec: &str,
        stable_only: bool,
        releases: &[ToolRelease],
    ) -> Option<ToolRelease>;
}
