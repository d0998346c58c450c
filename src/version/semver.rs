use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

/// First run of up to three dot-separated numbers that is not part of a longer
/// digit sequence. Components are capped at 16 digits.
static COERCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\d])(\d{1,16})(?:\.(\d{1,16}))?(?:\.(\d{1,16}))?(?:$|[^\d])")
        .expect("coerce pattern is valid")
});

/// Parse a full version, tolerating a leading `v` or `=` and surrounding whitespace.
///
/// Examples:
/// - "1.2.3" -> Version(1, 2, 3)
/// - "v0.4.5-rc7" -> Version(0, 4, 5, pre: rc7)
/// - "1.2" -> None
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim().trim_start_matches(['v', '=']);
    Version::parse(trimmed).ok()
}

/// Normalize a full version string into its canonical form, if it is one.
pub fn clean(version: &str) -> Option<String> {
    parse_version(version).map(|v| v.to_string())
}

/// Best-effort conversion of arbitrary text into a `MAJOR.MINOR.PATCH` version.
///
/// Picks the first numeric run in the input and pads missing components
/// with zeros. Prerelease and build information is dropped.
///
/// Examples:
/// - "0.4.5.7" -> 0.4.5
/// - "tor-0.4.8" -> 0.4.8
/// - "v2" -> 2.0.0
/// - "beta" -> None
pub fn coerce(raw: &str) -> Option<Version> {
    let captures = COERCE_PATTERN.captures(raw)?;
    let component = |index: usize| -> Option<u64> {
        match captures.get(index) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    Some(Version::new(component(1)?, component(2)?, component(3)?))
}
