//! torrc materialisation and tor process handling

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::TORRC_FILE;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Failed to write {path}: {source}")]
    WriteConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited immediately without a process id")]
    NoPid { program: String },
}

/// Write `contents` to `{dir}/torrc` and return its path
pub async fn write_config(dir: &Path, contents: &str) -> Result<PathBuf, DaemonError> {
    let path = dir.join(TORRC_FILE);
    let write = async {
        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(&path, contents).await
    };
    write.await.map_err(|source| DaemonError::WriteConfig {
        path: path.clone(),
        source,
    })?;

    debug!("Wrote tor configuration to {}", path.display());
    Ok(path)
}

/// Start `tor` in the background, detached from this process' stdio.
///
/// Returns the process id. The child keeps running after this process exits.
pub fn spawn_daemon(program: &Path, config: Option<&Path>) -> Result<u32, DaemonError> {
    let mut command = Command::new(program);
    if let Some(config) = config {
        command.arg("-f").arg(config);
    }
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(false);
    #[cfg(unix)]
    command.process_group(0);

    let child = command.spawn().map_err(|source| DaemonError::Spawn {
        program: program.display().to_string(),
        source,
    })?;

    child.id().ok_or_else(|| DaemonError::NoPid {
        program: program.display().to_string(),
    })
}

/// Output of `tor --version`
pub async fn tor_version(program: &Path) -> Result<String, DaemonError> {
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| DaemonError::Spawn {
            program: program.display().to_string(),
            source,
        })?;

    Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
}
