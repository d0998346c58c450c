//! Host platform identification
//!
//! Manifest entries name platforms and architectures the way the CI runner's
//! node runtime does (`linux`, `darwin`, `win32`; `x64`, `arm64`). The host is
//! detected once and passed explicitly to everything that filters on it.

use std::fmt;
use std::process::Command;

use tracing::debug;

/// Release description read on linux hosts
const OS_RELEASE_FILE: &str = "/etc/os-release";

/// Operating system and CPU architecture of the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub os: String,
    pub arch: String,
    /// OS release, when known; used to honour `platform_version` constraints
    pub os_version: Option<String>,
}

impl Platform {
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_string(),
            arch: arch.to_string(),
            os_version: None,
        }
    }

    /// Detect the platform this process runs on, including the OS release
    pub fn current() -> Self {
        let mut platform = Self::new(
            os_identifier(std::env::consts::OS),
            arch_identifier(std::env::consts::ARCH),
        );
        platform.os_version = detect_os_version(&platform.os);
        debug!("Host platform {} ({:?})", platform, platform.os_version);
        platform
    }

    pub fn with_os_version(mut self, os_version: &str) -> Self {
        self.os_version = Some(os_version.to_string());
        self
    }

    /// File name of the tor executable on this platform
    pub fn executable_name(&self) -> &'static str {
        if self.os == "win32" { "tor.exe" } else { "tor" }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

/// Map a Rust target OS name onto the manifest's platform naming
fn os_identifier(os: &str) -> &str {
    match os {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// OS release of the host: `VERSION_ID` on linux, `sw_vers` on darwin
fn detect_os_version(os: &str) -> Option<String> {
    match os {
        "linux" => std::fs::read_to_string(OS_RELEASE_FILE)
            .ok()
            .and_then(|contents| os_release_version(&contents)),
        "darwin" => Command::new("sw_vers")
            .arg("-productVersion")
            .output()
            .ok()
            .filter(|output| output.status.success())
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .filter(|version| !version.is_empty()),
        _ => None,
    }
}

/// Unquoted `VERSION_ID` of os-release contents
fn os_release_version(contents: &str) -> Option<String> {
    contents
        .lines()
        .find_map(|line| line.trim().strip_prefix("VERSION_ID="))
        .map(|value| value.trim().trim_matches(['"', '\'']).to_string())
        .filter(|value| !value.is_empty())
}

/// Map a Rust target architecture onto the manifest's architecture naming
fn arch_identifier(arch: &str) -> &str {
    match arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        "powerpc64" => "ppc64",
        other => other,
    }
}
