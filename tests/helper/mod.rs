//! Shared fixtures for integration tests
#![allow(dead_code, unused_imports)]

mod manifest;

pub use manifest::{
    ARCHIVE_ROOT, MockedManifest, mock_archive, mock_manifest, runner_config, tor_archive,
};
