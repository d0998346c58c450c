//! A GitHub API stand-in serving the versions manifest and release archives

use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use mockito::{Mock, ServerGuard};

use setup_tor::config::RunnerConfig;

/// Top-level directory inside the generated archives
pub const ARCHIVE_ROOT: &str = "tor-0.4.5.7";

const TOR_SCRIPT: &str = "#!/bin/sh\n\
case \"$1\" in\n\
  --version) echo \"Tor version 0.4.5.7.\" ;;\n\
esac\n";

/// Mocks registered for one manifest fetch
pub struct MockedManifest {
    pub tree: Mock,
    pub blob: Mock,
}

impl MockedManifest {
    pub async fn assert_async(&self) {
        self.tree.assert_async().await;
        self.blob.assert_async().await;
    }
}

/// Manifest listing an unstable 0.4.7 alpha, a stable 0.4.6 and the 0.4.5.7
/// release candidate, all for linux/x64 and hosted on `base_url`.
fn manifest_json(base_url: &str) -> String {
    format!(
        r#"[
  {{
    "version": "0.4.7-alpha1",
    "stable": false,
    "files": [
      {{"filename": "tor-linux-x64-0.4.7.1.tar.gz", "platform": "linux", "arch": "x64",
        "download_url": "{base}/download/tor-linux-x64-0.4.7.1.tar.gz"}}
    ]
  }},
  {{
    "version": "0.4.6",
    "stable": true,
    "release_url": "{base}/releases/0.4.6",
    "files": [
      {{"filename": "tor-darwin-x64-0.4.6.tar.gz", "platform": "darwin", "arch": "x64",
        "download_url": "{base}/download/tor-darwin-x64-0.4.6.tar.gz"}},
      {{"filename": "tor-linux-x64-0.4.6.tar.gz", "platform": "linux", "arch": "x64",
        "download_url": "{base}/download/tor-linux-x64-0.4.6.tar.gz"}}
    ]
  }},
  {{
    "version": "0.4.5-rc7",
    "stable": true,
    "files": [
      {{"filename": "tor-linux-x64-0.4.5.7.tar.gz", "platform": "linux", "arch": "x64",
        "download_url": "{base}/download/tor-linux-x64-0.4.5.7.tar.gz"}}
    ]
  }}
]"#,
        base = base_url
    )
}

/// Register the trees and blob endpoints for `tor-actions/versions@main`
pub async fn mock_manifest(server: &mut ServerGuard) -> MockedManifest {
    let tree_body = format!(
        r#"{{"sha": "main", "tree": [{{"path": "versions-manifest.json", "url": "{}/repos/tor-actions/versions/git/blobs/f00d"}}]}}"#,
        server.url()
    );
    let manifest = manifest_json(&server.url());

    let tree = server
        .mock("GET", "/repos/tor-actions/versions/git/trees/main")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(tree_body)
        .create_async()
        .await;
    let blob = server
        .mock("GET", "/repos/tor-actions/versions/git/blobs/f00d")
        .match_header("accept", "application/vnd.github.VERSION.raw")
        .with_status(200)
        .with_body(manifest)
        .create_async()
        .await;

    MockedManifest { tree, blob }
}

/// Serve a generated tor archive as `/download/{file_name}`
pub async fn mock_archive(server: &mut ServerGuard, file_name: &str) -> Mock {
    server
        .mock("GET", format!("/download/{file_name}").as_str())
        .with_status(200)
        .with_body(tor_archive())
        .create_async()
        .await
}

/// A gzipped tarball shaped like a tor release: `{root}/bin/tor` plus data
pub fn tor_archive() -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    append(&mut builder, &format!("{ARCHIVE_ROOT}/bin/tor"), TOR_SCRIPT.as_bytes(), 0o755);
    append(
        &mut builder,
        &format!("{ARCHIVE_ROOT}/share/tor/geoip"),
        b"# geoip\n",
        0o644,
    );
    builder
        .into_inner()
        .expect("finish tar stream")
        .finish()
        .expect("finish gzip stream")
}

fn append(builder: &mut tar::Builder<GzEncoder<Vec<u8>>>, path: &str, data: &[u8], mode: u32) {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(mode);
    header.set_cksum();
    builder
        .append_data(&mut header, path, data)
        .expect("append archive entry");
}

/// Runner environment rooted in `root`, with command files for PATH and outputs
pub fn runner_config(root: &Path) -> RunnerConfig {
    RunnerConfig {
        tool_cache_dir: root.join("tool-cache"),
        temp_dir: root.join("temp"),
        server_url: "https://github.com".to_string(),
        path_file: Some(root.join("github_path")),
        output_file: Some(root.join("github_output")),
    }
}
