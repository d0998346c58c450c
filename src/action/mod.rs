//! Runner-facing entry point of the action
//!
//! # Modules
//!
//! - [`workflow`]: Runner commands (PATH, outputs, failure)
//! - [`daemon`]: torrc file and background tor process

pub mod daemon;
pub mod workflow;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ActionInputs, RunnerConfig};
use crate::install::download::DownloadError;
use crate::install::{DirToolCache, HttpDownloader, InstallError, Installer, TarExtractor};
use crate::system::Platform;
use crate::version::error::ManifestError;
use crate::version::matchers::ManifestMatcher;
use crate::version::normalize::normalize_version;
use crate::version::registries::GitHubManifestSource;
use crate::version::registry::ManifestSource;
use crate::version::resolver::ManifestResolver;
use daemon::{DaemonError, spawn_daemon, tor_version, write_config};
use workflow::WorkflowCommands;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Install(#[from] InstallError),

    #[error(transparent)]
    Daemon(#[from] DaemonError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error("Failed to write runner command: {0}")]
    Command(#[from] io::Error),
}

/// The action bound to one runner environment
pub struct SetupTor<W: Write> {
    installer: Installer,
    runner: RunnerConfig,
    platform: Platform,
    commands: WorkflowCommands<W>,
}

impl SetupTor<io::Stdout> {
    /// Wire up the production collaborators for `runner`
    pub fn from_runner(runner: RunnerConfig) -> Result<Self, ActionError> {
        let platform = Platform::current();
        let source: Arc<dyn ManifestSource> = Arc::new(GitHubManifestSource::github()?);
        let commands =
            WorkflowCommands::stdout(runner.path_file.clone(), runner.output_file.clone());
        let installer = build_installer(source, &runner, platform.clone())?;

        Ok(Self::new(installer, runner, platform, commands))
    }
}

impl<W: Write> SetupTor<W> {
    pub fn new(
        installer: Installer,
        runner: RunnerConfig,
        platform: Platform,
        commands: WorkflowCommands<W>,
    ) -> Self {
        Self {
            installer,
            runner,
            platform,
            commands,
        }
    }

    /// Install the requested tor, then optionally configure and start it
    pub async fn run(&mut self, inputs: &ActionInputs) -> Result<(), ActionError> {
        let version = normalize_version(inputs.requested_version());
        let stable = inputs.stable_only();
        info!("{}", setup_message(stable, &version));

        let mut program = PathBuf::from(self.platform.executable_name());

        if !version.is_empty() {
            let auth = self.runner.auth_header(inputs.token.as_deref());
            let install_dir = self
                .installer
                .get_tor(&version, stable, auth.as_deref())
                .await?;
            debug!("Installed directory {}", install_dir.display());

            let bin_dir = install_dir.join("bin");
            self.commands.add_path(&bin_dir)?;
            info!("Added tor to the path");

            program = installed_program(&bin_dir, &self.platform).unwrap_or(program);
            self.commands.set_output("tor-version", &version)?;
            info!("Successfully setup tor version {}", version);
        }

        let config_path = match inputs.config.as_deref().filter(|c| !c.is_empty()) {
            Some(contents) => {
                let path = write_config(&self.runner.temp_dir, contents).await?;
                self.commands
                    .set_output("config-path", &path.display().to_string())?;
                Some(path)
            }
            None => None,
        };

        if inputs.daemon_enabled() {
            let pid = spawn_daemon(&program, config_path.as_deref())?;
            info!("Started tor in the background (pid {})", pid);
            self.commands.set_output("pid", &pid.to_string())?;
        }

        info!("{}", tor_version(&program).await?);
        Ok(())
    }
}

/// Installer using the HTTP downloader, tar extraction and the runner's tool cache
pub fn build_installer(
    source: Arc<dyn ManifestSource>,
    runner: &RunnerConfig,
    platform: Platform,
) -> Result<Installer, ActionError> {
    let resolver = ManifestResolver::new(source, Arc::new(ManifestMatcher::new(platform.clone())));

    Ok(Installer::new(
        resolver,
        Arc::new(HttpDownloader::new(&runner.temp_dir)?),
        Arc::new(TarExtractor::default()),
        Arc::new(DirToolCache::new(&runner.tool_cache_dir)),
        platform,
        &runner.temp_dir,
    ))
}

fn setup_message(stable: bool, version: &str) -> String {
    format!(
        "Setup tor {} version {}",
        if stable { "stable" } else { "" },
        version
    )
}

/// The tor executable inside an installed `bin` directory, if present
fn installed_program(bin_dir: &Path, platform: &Platform) -> Option<PathBuf> {
    let program = bin_dir.join(platform.executable_name());
    program.is_file().then_some(program)
}
