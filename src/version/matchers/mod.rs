//! Release matcher implementations

pub mod manifest;

pub use manifest::ManifestMatcher;
