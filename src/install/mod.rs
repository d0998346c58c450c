//! Tool acquisition: download, extraction and the local tool cache
//!
//! [`installer::Installer`] ties these together with the version resolver.

pub mod download;
pub mod extract;
pub mod installer;
pub mod tool_cache;

pub use download::HttpDownloader;
pub use extract::TarExtractor;
pub use installer::{InstallError, Installer};
pub use tool_cache::DirToolCache;
