//! Manifest source implementations

pub mod github;

pub use github::GitHubManifestSource;
