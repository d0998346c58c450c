//! Version range satisfaction with node-semver rules
//!
//! Supports:
//! - `1.2.3`, `=1.2.3`, `v1.2.3` - exact match
//! - `^1.2.3` - compatible with version (>=1.2.3 <2.0.0)
//! - `~1.2.3` - approximately equivalent (>=1.2.3 <1.3.0)
//! - `>=1.2.3`, `>1.2.3`, `<=1.2.3`, `<1.2.3` - comparison operators
//! - `1.2.x`, `1.x`, `1.2`, `1`, `*` - wildcards and partial versions
//! - `1.0.0 - 2.0.0` - hyphen ranges
//! - `>=1.0.0 <2.0.0` (AND) and `^1.0.0 || ^2.0.0` (OR)
//!
//! A prerelease version only satisfies a comparator set that itself names a
//! prerelease on the same `major.minor.patch`.

use semver::Version;

use crate::version::semver::parse_version;

/// A parsed version range
#[derive(Debug, Clone)]
pub struct VersionRequirement {
    /// OR of comparator sets, each an AND of primitive comparators
    sets: Vec<Vec<Comparator>>,
}

impl VersionRequirement {
    /// Parse a range specification. An empty specification matches everything.
    pub fn parse(spec: &str) -> Option<Self> {
        let sets: Option<Vec<Vec<Comparator>>> =
            spec.split("||").map(parse_comparator_set).collect();
        sets.map(|sets| Self { sets })
    }

    /// Check if a version satisfies this requirement
    pub fn satisfies(&self, version: &Version) -> bool {
        self.sets.iter().any(|set| {
            set.iter().all(|comparator| comparator.satisfies(version))
                && allows_prerelease(set, version)
        })
    }
}

/// Parse one AND-set (space-separated ranges, or a single hyphen range)
fn parse_comparator_set(spec: &str) -> Option<Vec<Comparator>> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Some(Vec::new());
    }

    if let Some((from, to)) = spec.split_once(" - ") {
        return Some(hyphen(parse_partial(from)?, parse_partial(to)?));
    }

    let mut set = Vec::new();
    for part in join_operators(spec) {
        set.extend(parse_range(&part)?);
    }
    Some(set)
}

/// Split on whitespace, re-attaching operators written apart from their
/// version (`>= 1.2.3`).
fn join_operators(spec: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut pending = String::new();

    for token in spec.split_whitespace() {
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '^' | '~')) {
            pending.push_str(token);
            continue;
        }
        parts.push(format!("{pending}{token}"));
        pending.clear();
    }

    if !pending.is_empty() {
        parts.push(pending);
    }
    parts
}

/// Prerelease versions are excluded unless a comparator in the same set
/// carries a prerelease on the same version tuple.
fn allows_prerelease(set: &[Comparator], version: &Version) -> bool {
    if version.pre.is_empty() {
        return true;
    }

    set.iter().map(|comparator| &comparator.version).any(|anchor| {
        !anchor.pre.is_empty()
            && anchor.major == version.major
            && anchor.minor == version.minor
            && anchor.patch == version.patch
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A single `<op><full version>` test; every range form desugars into these
#[derive(Debug, Clone)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn new(op: Op, version: Version) -> Self {
        Self { op, version }
    }

    /// Matches no release version
    fn never() -> Self {
        Self::new(Op::Lt, Version::new(0, 0, 0))
    }

    fn satisfies(&self, version: &Version) -> bool {
        match self.op {
            Op::Eq => *version == self.version,
            Op::Gt => *version > self.version,
            Op::Gte => *version >= self.version,
            Op::Lt => *version < self.version,
            Op::Lte => *version <= self.version,
        }
    }
}

/// A version operand as written, with unspecified trailing components.
///
/// Components after the first `x`, `X` or `*` count as unspecified, so
/// `1.x.0` is the same operand as `1`.
#[derive(Debug, Clone, PartialEq)]
enum Partial {
    Any,
    Major(u64),
    Minor(u64, u64),
    Full(Version),
}

impl Partial {
    /// Smallest version the operand covers
    fn lower(&self) -> Version {
        match self {
            Partial::Any => Version::new(0, 0, 0),
            Partial::Major(major) => Version::new(*major, 0, 0),
            Partial::Minor(major, minor) => Version::new(*major, *minor, 0),
            Partial::Full(version) => version.clone(),
        }
    }

    /// First version past everything the operand covers
    fn next(&self) -> Option<Version> {
        match self {
            Partial::Major(major) => Some(Version::new(major + 1, 0, 0)),
            Partial::Minor(major, minor) => Some(Version::new(*major, minor + 1, 0)),
            Partial::Any | Partial::Full(_) => None,
        }
    }

    /// `>=lower <next` for partial operands, `=version` for full ones
    fn span(&self) -> Vec<Comparator> {
        match (self, self.next()) {
            (Partial::Full(version), _) => vec![Comparator::new(Op::Eq, version.clone())],
            (_, Some(next)) => vec![
                Comparator::new(Op::Gte, self.lower()),
                Comparator::new(Op::Lt, next),
            ],
            (_, None) => Vec::new(),
        }
    }
}

/// Parse an operand such as `1`, `1.2`, `1.2.x`, `v1.2.3` or `1.2.3-rc1`
fn parse_partial(operand: &str) -> Option<Partial> {
    let operand = operand.trim().trim_start_matches(['v', '=']);
    if let Some(version) = parse_version(operand) {
        return Some(Partial::Full(version));
    }

    let parts: Vec<&str> = operand.split('.').collect();
    if parts.len() > 3 {
        return None;
    }

    let mut numbers = Vec::with_capacity(3);
    let mut wildcard_seen = false;
    for part in parts {
        if is_wildcard(part) {
            wildcard_seen = true;
            continue;
        }
        let number = part.parse::<u64>().ok()?;
        if !wildcard_seen {
            numbers.push(number);
        }
    }

    match numbers.as_slice() {
        [] => Some(Partial::Any),
        [major] => Some(Partial::Major(*major)),
        [major, minor] => Some(Partial::Minor(*major, *minor)),
        [major, minor, patch] => Some(Partial::Full(Version::new(*major, *minor, *patch))),
        _ => None,
    }
}

/// Desugar one range token into primitive comparators
fn parse_range(token: &str) -> Option<Vec<Comparator>> {
    let token = token.trim();

    if let Some(rest) = token.strip_prefix(">=") {
        Some(primitive(Op::Gte, parse_partial(rest)?))
    } else if let Some(rest) = token.strip_prefix('>') {
        Some(primitive(Op::Gt, parse_partial(rest)?))
    } else if let Some(rest) = token.strip_prefix("<=") {
        Some(primitive(Op::Lte, parse_partial(rest)?))
    } else if let Some(rest) = token.strip_prefix('<') {
        Some(primitive(Op::Lt, parse_partial(rest)?))
    } else if let Some(rest) = token.strip_prefix('^') {
        Some(caret(parse_partial(rest)?))
    } else if let Some(rest) = token.strip_prefix('~') {
        Some(tilde(parse_partial(rest.trim_start_matches('>'))?))
    } else {
        Some(parse_partial(token)?.span())
    }
}

/// `>1.2` is `>=1.3.0`, `<=1.2` is `<1.3.0`, `>=1.2` is `>=1.2.0`, `<1.2` is `<1.2.0`
fn primitive(op: Op, operand: Partial) -> Vec<Comparator> {
    match (&operand, op) {
        (Partial::Full(version), _) => vec![Comparator::new(op, version.clone())],
        (Partial::Any, Op::Gt | Op::Lt) => vec![Comparator::never()],
        (Partial::Any, _) => Vec::new(),
        (_, Op::Gt | Op::Lte) => match operand.next() {
            Some(next) if op == Op::Gt => vec![Comparator::new(Op::Gte, next)],
            Some(next) => vec![Comparator::new(Op::Lt, next)],
            None => Vec::new(),
        },
        (_, Op::Gte) => vec![Comparator::new(Op::Gte, operand.lower())],
        (_, Op::Lt) => vec![Comparator::new(Op::Lt, operand.lower())],
        (_, Op::Eq) => operand.span(),
    }
}

/// `^` allows changes that keep the left-most non-zero component
fn caret(operand: Partial) -> Vec<Comparator> {
    let upper = match &operand {
        Partial::Any => return Vec::new(),
        Partial::Major(major) => Version::new(major + 1, 0, 0),
        Partial::Minor(0, minor) => Version::new(0, minor + 1, 0),
        Partial::Minor(major, _) => Version::new(major + 1, 0, 0),
        Partial::Full(v) if v.major > 0 => Version::new(v.major + 1, 0, 0),
        Partial::Full(v) if v.minor > 0 => Version::new(0, v.minor + 1, 0),
        Partial::Full(v) => Version::new(0, 0, v.patch + 1),
    };
    vec![
        Comparator::new(Op::Gte, operand.lower()),
        Comparator::new(Op::Lt, upper),
    ]
}

/// `~` allows patch changes when a minor is given, minor changes otherwise
fn tilde(operand: Partial) -> Vec<Comparator> {
    match &operand {
        Partial::Full(v) => vec![
            Comparator::new(Op::Gte, v.clone()),
            Comparator::new(Op::Lt, Version::new(v.major, v.minor + 1, 0)),
        ],
        _ => operand.span(),
    }
}

/// `1.2 - 2` is `>=1.2.0 <3.0.0`; a full upper bound is inclusive
fn hyphen(from: Partial, to: Partial) -> Vec<Comparator> {
    let mut set = Vec::with_capacity(2);
    if from != Partial::Any {
        set.push(Comparator::new(Op::Gte, from.lower()));
    }
    match (&to, to.next()) {
        (Partial::Full(version), _) => set.push(Comparator::new(Op::Lte, version.clone())),
        (_, Some(next)) => set.push(Comparator::new(Op::Lt, next)),
        (_, None) => {}
    }
    set
}

fn is_wildcard(part: &str) -> bool {
    part == "*" || part.eq_ignore_ascii_case("x")
}
