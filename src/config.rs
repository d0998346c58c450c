use std::path::PathBuf;

// =============================================================================
// Product and manifest constants
// =============================================================================

/// Tool name used as the tool-cache key and stripped from raw version strings
pub const TOOL_NAME: &str = "tor";

/// Organization publishing the release manifest
pub const MANIFEST_OWNER: &str = "tor-actions";

/// Repository holding `versions-manifest.json`
pub const MANIFEST_REPO: &str = "versions";

/// Branch the manifest is read from
pub const MANIFEST_BRANCH: &str = "main";

/// File name of the manifest inside the repository tree
pub const MANIFEST_FILE: &str = "versions-manifest.json";

/// Default base URL for the GitHub API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Server URL assumed when the runner does not report one
pub const DEFAULT_GITHUB_SERVER_URL: &str = "https://github.com";

/// User-Agent sent with every HTTP request
pub const USER_AGENT: &str = concat!("setup-tor/", env!("CARGO_PKG_VERSION"));

/// Name of the materialized tor configuration file
pub const TORRC_FILE: &str = "torrc";

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "SETUP_TOR_LOG";

/// Inputs of the action, as handed over by the CLI layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionInputs {
    /// `tor-version` input
    pub tor_version: String,
    /// `version` input, used when `tor-version` is empty
    pub version: String,
    /// `stable` input
    pub stable: String,
    /// `token` input
    pub token: Option<String>,
    /// Contents of the torrc file to materialize
    pub config: Option<String>,
    /// `daemon` input
    pub daemon: String,
}

impl ActionInputs {
    /// The requested version, preferring `tor-version` over `version`
    pub fn requested_version(&self) -> &str {
        if self.tor_version.is_empty() {
            &self.version
        } else {
            &self.tor_version
        }
    }

    /// Stable-only resolution is on unless the input says otherwise.
    /// Anything but a case-insensitive `true` disables it.
    pub fn stable_only(&self) -> bool {
        let stable = if self.stable.is_empty() {
            "true"
        } else {
            self.stable.as_str()
        };
        stable.eq_ignore_ascii_case("true")
    }

    /// Launch tor in the background after installing. Off unless `true`
    pub fn daemon_enabled(&self) -> bool {
        self.daemon.trim().eq_ignore_ascii_case("true")
    }
}

/// Runner environment the action executes in
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Root of the tool cache (`RUNNER_TOOL_CACHE`)
    pub tool_cache_dir: PathBuf,
    /// Scratch directory for downloads and extraction (`RUNNER_TEMP`)
    pub temp_dir: PathBuf,
    /// URL of the GitHub server the workflow runs against
    pub server_url: String,
    /// File receiving PATH additions (`GITHUB_PATH`)
    pub path_file: Option<PathBuf>,
    /// File receiving step outputs (`GITHUB_OUTPUT`)
    pub output_file: Option<PathBuf>,
}

impl RunnerConfig {
    /// Reads the runner configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::cache_dir())
    }

    fn from_lookup<F>(lookup: F, cache_dir: Option<PathBuf>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let tool_cache_dir = non_empty("RUNNER_TOOL_CACHE")
            .map(PathBuf::from)
            .unwrap_or_else(|| default_tool_cache_dir(cache_dir));
        let temp_dir = non_empty("RUNNER_TEMP")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        Self {
            tool_cache_dir,
            temp_dir,
            server_url: non_empty("GITHUB_SERVER_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_SERVER_URL.to_string()),
            path_file: non_empty("GITHUB_PATH").map(PathBuf::from),
            output_file: non_empty("GITHUB_OUTPUT").map(PathBuf::from),
        }
    }

    /// Whether the workflow runs on GitHub Enterprise Server.
    /// Tokens are never forwarded to github.com from there.
    pub fn is_ghes(&self) -> bool {
        let host = self
            .server_url
            .split_once("://")
            .map_or(self.server_url.as_str(), |(_, rest)| rest)
            .split(['/', ':'])
            .next()
            .unwrap_or_default();
        !host.eq_ignore_ascii_case("github.com")
    }

    /// Authorization header value for manifest and download requests
    pub fn auth_header(&self, token: Option<&str>) -> Option<String> {
        match token {
            Some(token) if !token.is_empty() && !self.is_ghes() => Some(format!("token {token}")),
            _ => None,
        }
    }
}

/// Falls back to `<cache dir>/setup-tor/tool-cache`, or `./tool-cache` when no
/// cache directory is available.
fn default_tool_cache_dir(cache_dir: Option<PathBuf>) -> PathBuf {
    cache_dir
        .map(|dir| dir.join("setup-tor"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tool-cache")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn from_lookup_reads_runner_variables() {
        let config = RunnerConfig::from_lookup(
            lookup_from(&[
                ("RUNNER_TOOL_CACHE", "/opt/hostedtoolcache"),
                ("RUNNER_TEMP", "/home/runner/work/_temp"),
                ("GITHUB_SERVER_URL", "https://github.com"),
                ("GITHUB_PATH", "/home/runner/path"),
                ("GITHUB_OUTPUT", "/home/runner/output"),
            ]),
            None,
        );

        assert_eq!(
            config,
            RunnerConfig {
                tool_cache_dir: PathBuf::from("/opt/hostedtoolcache"),
                temp_dir: PathBuf::from("/home/runner/work/_temp"),
                server_url: "https://github.com".to_string(),
                path_file: Some(PathBuf::from("/home/runner/path")),
                output_file: Some(PathBuf::from("/home/runner/output")),
            }
        );
    }

    #[test]
    fn from_lookup_falls_back_to_cache_dir_for_tool_cache() {
        let config =
            RunnerConfig::from_lookup(lookup_from(&[]), Some(PathBuf::from("/home/user/.cache")));

        assert_eq!(
            config.tool_cache_dir,
            PathBuf::from("/home/user/.cache/setup-tor/tool-cache")
        );
        assert_eq!(config.server_url, DEFAULT_GITHUB_SERVER_URL);
        assert_eq!(config.path_file, None);
        assert_eq!(config.output_file, None);
    }

    #[test]
    fn from_lookup_treats_empty_variables_as_unset() {
        let config = RunnerConfig::from_lookup(
            lookup_from(&[("RUNNER_TOOL_CACHE", ""), ("GITHUB_PATH", "")]),
            None,
        );

        assert_eq!(config.tool_cache_dir, PathBuf::from("./tool-cache"));
        assert_eq!(config.path_file, None);
    }

    #[rstest]
    #[case("https://github.com", false)]
    #[case("https://GITHUB.COM/", false)]
    #[case("https://github.example.com", true)]
    #[case("https://ghes.internal:8443/api", true)]
    fn is_ghes_compares_hostname(#[case] server_url: &str, #[case] expected: bool) {
        let config = RunnerConfig::from_lookup(
            lookup_from(&[("GITHUB_SERVER_URL", server_url)]),
            None,
        );
        assert_eq!(config.is_ghes(), expected);
    }

    #[rstest]
    #[case("https://github.com", Some("abc"), Some("token abc"))]
    #[case("https://github.com", Some(""), None)]
    #[case("https://github.com", None, None)]
    #[case("https://github.example.com", Some("abc"), None)]
    fn auth_header_formats_token(
        #[case] server_url: &str,
        #[case] token: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let config = RunnerConfig::from_lookup(
            lookup_from(&[("GITHUB_SERVER_URL", server_url)]),
            None,
        );
        assert_eq!(config.auth_header(token), expected.map(str::to_string));
    }

    #[rstest]
    #[case("0.4.5.7", "", "0.4.5.7")]
    #[case("", "0.4.5.7", "0.4.5.7")]
    #[case("0.4.6", "0.4.5.7", "0.4.6")]
    fn requested_version_prefers_tor_version(
        #[case] tor_version: &str,
        #[case] version: &str,
        #[case] expected: &str,
    ) {
        let inputs = ActionInputs {
            tor_version: tor_version.to_string(),
            version: version.to_string(),
            ..Default::default()
        };
        assert_eq!(inputs.requested_version(), expected);
    }

    #[rstest]
    #[case("", true)]
    #[case("true", true)]
    #[case("TRUE", true)]
    #[case("false", false)]
    #[case("yes", false)]
    fn stable_only_requires_literal_true(#[case] stable: &str, #[case] expected: bool) {
        let inputs = ActionInputs {
            stable: stable.to_string(),
            ..Default::default()
        };
        assert_eq!(inputs.stable_only(), expected);
    }

    #[rstest]
    #[case("", false)]
    #[case("true", true)]
    #[case("True", true)]
    #[case("TRUE", true)]
    #[case("false", false)]
    #[case("False", false)]
    #[case("1", false)]
    fn daemon_enabled_accepts_any_case_of_true(#[case] daemon: &str, #[case] expected: bool) {
        let inputs = ActionInputs {
            daemon: daemon.to_string(),
            ..Default::default()
        };
        assert_eq!(inputs.daemon_enabled(), expected);
    }
}
