//! Conversion of upstream tor version strings into semantic versions
//!
//! Upstream releases use a four-part scheme and glue prerelease tags directly
//! onto the number. The conversion rules:
//!
//! - `1.13.1` -> `1.13.1`
//! - `1.13` -> `1.13.0`
//! - `1.10beta1` -> `1.10.0-beta1`, `1.10rc1` -> `1.10.0-rc1`
//! - `1.8.5beta1` -> `1.8.5-beta1`, `1.8.5rc1` -> `1.8.5-rc1`
//! - `0.4.5.7` -> `0.4.5-rc7`

use crate::config::TOOL_NAME;
use crate::version::semver::coerce;

/// Convert a raw version specifier into semantic-version form.
///
/// Never fails: input that matches none of the rules comes back unchanged
/// (or best-effort coerced in the four-part case).
pub fn normalize_version(raw: &str) -> String {
    let stripped = raw.replacen(TOOL_NAME, "", 1);
    let tagged = stripped.replacen("beta", "-beta", 1).replacen("rc", "-rc", 1);

    let mut segments = tagged.split('-');
    let numeric = segments.next().unwrap_or_default();
    // Only the last dash segment survives as the prerelease tag
    let mut prerelease = segments
        .last()
        .map(|tag| format!("-{tag}"))
        .unwrap_or_default();

    let components: Vec<&str> = numeric.split('.').collect();
    let numeric = match components.as_slice() {
        [_, _] => format!("{numeric}.0"),
        [_, _, _, candidate] => {
            prerelease = format!("-rc{candidate}");
            coerce(raw)
                .map(|version| version.to_string())
                .unwrap_or_else(|| raw.to_string())
        }
        _ => numeric.to_string(),
    };

    let joined = format!("{numeric}{prerelease}");
    match joined.strip_suffix('-') {
        Some(trimmed) => trimmed.to_string(),
        None => joined,
    }
}
