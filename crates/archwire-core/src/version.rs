//! Semantic version parsing, precedence, and constraint matching.
//!
//! Versions follow the `major.minor.patch[-prerelease][+build]` shape.
//! Precedence is total on the numeric triple, with a release outranking
//! any prerelease of the identical triple. Two *distinct* prerelease
//! strings at the same triple are mutually unordered — [`Version::precedence`]
//! returns `None` for them instead of imposing the full semver identifier
//! ordering. Build metadata never participates in precedence.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Errors produced by version and constraint parsing.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VersionError {
    /// The input is not a valid `major.minor.patch[-pre][+build]` version.
    #[error("invalid version `{input}`: {message}")]
    InvalidVersion { input: String, message: String },

    /// The input is not a recognized constraint (exact, `^`, `~`, or `*`).
    #[error("invalid constraint `{input}`: {message}")]
    InvalidConstraint { input: String, message: String },
}

/// A parsed semantic version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Major component.
    pub major: u64,
    /// Minor component.
    pub minor: u64,
    /// Patch component.
    pub patch: u64,
    /// Prerelease qualifier (`-alpha.1`), without the leading dash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prerelease: Option<String>,
    /// Build metadata (`+build.5`), without the leading plus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
}

impl Version {
    /// Create a release version from its numeric triple.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Attach a prerelease qualifier.
    pub fn with_prerelease(mut self, prerelease: impl Into<String>) -> Self {
        self.prerelease = Some(prerelease.into());
        self
    }

    /// Attach build metadata.
    pub fn with_build(mut self, build: impl Into<String>) -> Self {
        self.build = Some(build.into());
        self
    }

    /// Parse a version string.
    ///
    /// Accepts exactly the shape [`Version`]'s `Display` produces, so
    /// `Version::parse(v.to_string())` round-trips for every valid input.
    pub fn parse(input: &str) -> VersionResult<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(invalid_version(input, "empty string"));
        }

        let (rest, build) = match trimmed.split_once('+') {
            Some((rest, build)) => (rest, Some(build)),
            None => (trimmed, None),
        };
        let (triple, prerelease) = match rest.split_once('-') {
            Some((triple, pre)) => (triple, Some(pre)),
            None => (rest, None),
        };

        let mut parts = triple.split('.');
        let major = parse_numeric(parts.next(), "major", input)?;
        let minor = parse_numeric(parts.next(), "minor", input)?;
        let patch = parse_numeric(parts.next(), "patch", input)?;
        if parts.next().is_some() {
            return Err(invalid_version(input, "more than three numeric components"));
        }

        if let Some(pre) = prerelease {
            validate_qualifier(pre, "prerelease", input)?;
        }
        if let Some(build) = build {
            validate_qualifier(build, "build metadata", input)?;
        }

        Ok(Self {
            major,
            minor,
            patch,
            prerelease: prerelease.map(str::to_string),
            build: build.map(str::to_string),
        })
    }

    /// The numeric `(major, minor, patch)` triple.
    pub fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    /// Whether this version carries a prerelease qualifier.
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Compare two versions by precedence.
    ///
    /// Returns `None` exactly when both versions carry *distinct*
    /// prerelease qualifiers at the same numeric triple; those are
    /// mutually unordered. Build metadata is ignored.
    pub fn precedence(&self, other: &Self) -> Option<Ordering> {
        match self.triple().cmp(&other.triple()) {
            Ordering::Equal => match (&self.prerelease, &other.prerelease) {
                (None, None) => Some(Ordering::Equal),
                (None, Some(_)) => Some(Ordering::Greater),
                (Some(_), None) => Some(Ordering::Less),
                (Some(a), Some(b)) if a == b => Some(Ordering::Equal),
                _ => None,
            },
            ord => Some(ord),
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Precedence ignores build metadata, but PartialOrd must agree
        // with PartialEq, which does not. Versions equal in precedence
        // yet different in build compare as unordered.
        match self.precedence(other) {
            Some(Ordering::Equal) if self != other => None,
            ord => ord,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_numeric(part: Option<&str>, which: &str, input: &str) -> VersionResult<u64> {
    let part = part.ok_or_else(|| invalid_version(input, format!("missing {which} component")))?;
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid_version(
            input,
            format!("{which} component `{part}` is not a non-negative integer"),
        ));
    }
    part.parse()
        .map_err(|_| invalid_version(input, format!("{which} component `{part}` out of range")))
}

fn validate_qualifier(qualifier: &str, which: &str, input: &str) -> VersionResult<()> {
    let well_formed = !qualifier.is_empty()
        && qualifier
            .split('.')
            .all(|ident| !ident.is_empty() && ident.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-'));
    if well_formed {
        Ok(())
    } else {
        Err(invalid_version(
            input,
            format!("{which} `{qualifier}` contains empty or non-alphanumeric identifiers"),
        ))
    }
}

fn invalid_version(input: &str, message: impl Into<String>) -> VersionError {
    VersionError::InvalidVersion {
        input: input.to_string(),
        message: message.into(),
    }
}

/// A parsed version constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VersionRange {
    /// `1.2.3` — only versions precedence-equal to this one.
    Exact { version: Version },
    /// `^1.2.0` / `~1.2.0` — half-open interval `[min, max_exclusive)`.
    Between {
        min: Version,
        max_exclusive: Version,
    },
    /// `*` — unconstrained.
    Any,
}

impl VersionRange {
    /// Whether `candidate` satisfies this range.
    ///
    /// The upper bound excludes the whole numeric triple of
    /// `max_exclusive`, so a prerelease of the next major (`2.0.0-rc.1`
    /// against `^1.2.0`) never slips in.
    pub fn matches(&self, candidate: &Version) -> bool {
        match self {
            VersionRange::Any => true,
            VersionRange::Exact { version } => {
                matches!(candidate.precedence(version), Some(Ordering::Equal))
            }
            VersionRange::Between { min, max_exclusive } => {
                candidate.triple() < max_exclusive.triple()
                    && matches!(
                        candidate.precedence(min),
                        Some(Ordering::Greater | Ordering::Equal)
                    )
            }
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionRange::Exact { version } => write!(f, "{version}"),
            VersionRange::Between { min, max_exclusive } => {
                write!(f, ">={min}, <{max_exclusive}")
            }
            VersionRange::Any => write!(f, "*"),
        }
    }
}

/// Parse a constraint specification.
///
/// Recognized forms:
/// - exact: `1.2.3` (min = max)
/// - caret: `^1.2.0` — up to, excluding, the next major
/// - tilde: `~1.2.0` — up to, excluding, the next minor
/// - wildcard: `*`
pub fn parse_constraint(spec: &str) -> VersionResult<VersionRange> {
    let trimmed = spec.trim();
    if trimmed.is_empty() {
        return Err(invalid_constraint(spec, "empty constraint"));
    }
    if trimmed == "*" {
        return Ok(VersionRange::Any);
    }
    if let Some(rest) = trimmed.strip_prefix('^') {
        let min = parse_constraint_version(rest, spec)?;
        let max_exclusive = Version::new(min.major + 1, 0, 0);
        return Ok(VersionRange::Between { min, max_exclusive });
    }
    if let Some(rest) = trimmed.strip_prefix('~') {
        let min = parse_constraint_version(rest, spec)?;
        let max_exclusive = Version::new(min.major, min.minor + 1, 0);
        return Ok(VersionRange::Between { min, max_exclusive });
    }
    let version = parse_constraint_version(trimmed, spec)?;
    Ok(VersionRange::Exact { version })
}

fn parse_constraint_version(version_part: &str, spec: &str) -> VersionResult<Version> {
    Version::parse(version_part).map_err(|err| match err {
        VersionError::InvalidVersion { message, .. } => invalid_constraint(spec, message),
        other => other,
    })
}

fn invalid_constraint(input: &str, message: impl Into<String>) -> VersionError {
    VersionError::InvalidConstraint {
        input: input.to_string(),
        message: message.into(),
    }
}

/// Pick the highest version satisfying `range`, or `None` if none qualify.
///
/// Candidates are compared by precedence. When two matching prereleases
/// share a triple and are therefore unordered, the lexicographically
/// greater prerelease string wins — a deterministic selection policy only;
/// it does not make the two comparable.
pub fn find_best_match<'a>(versions: &'a [Version], range: &VersionRange) -> Option<&'a Version> {
    let mut best: Option<&Version> = None;
    for candidate in versions.iter().filter(|v| range.matches(v)) {
        best = Some(match best {
            None => candidate,
            Some(current) => match candidate.precedence(current) {
                Some(Ordering::Greater) => candidate,
                Some(_) => current,
                None => {
                    if candidate.prerelease.as_deref() > current.prerelease.as_deref() {
                        candidate
                    } else {
                        current
                    }
                }
            },
        });
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn parse_and_format_round_trip() {
        for input in [
            "0.0.0",
            "1.2.3",
            "10.20.30",
            "1.2.3-alpha",
            "1.2.3-alpha.1",
            "1.2.3+build.5",
            "1.2.3-rc.2+build.5",
        ] {
            assert_eq!(v(input).to_string(), input);
        }
    }

    #[test]
    fn rejects_malformed_versions() {
        for input in ["", "1", "1.2", "1.2.3.4", "a.b.c", "1.2.x", "1.-2.3", "1.2.3-"] {
            assert!(Version::parse(input).is_err(), "accepted `{input}`");
        }
    }

    #[test]
    fn release_outranks_prerelease_at_same_triple() {
        assert_eq!(
            v("1.2.3").precedence(&v("1.2.3-alpha")),
            Some(Ordering::Greater)
        );
        assert_eq!(
            v("1.2.3-alpha").precedence(&v("1.2.3")),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn distinct_prereleases_at_same_triple_are_unordered() {
        assert_eq!(v("1.2.3-alpha.1").precedence(&v("1.2.3-alpha.2")), None);
        assert_eq!(
            v("1.2.3-alpha").precedence(&v("1.2.3-alpha")),
            Some(Ordering::Equal)
        );
        // Triples still order prereleases across versions.
        assert_eq!(
            v("1.2.4-alpha").precedence(&v("1.2.3-beta")),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn build_metadata_is_ignored_by_precedence() {
        assert_eq!(
            v("1.2.3+a").precedence(&v("1.2.3+b")),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn caret_constraint_bounds() {
        let range = parse_constraint("^1.2.0").unwrap();
        assert!(range.matches(&v("1.2.0")));
        assert!(range.matches(&v("1.2.5")));
        assert!(range.matches(&v("1.9.0")));
        assert!(!range.matches(&v("1.1.9")));
        assert!(!range.matches(&v("2.0.0")));
        // Prereleases of the excluded major stay excluded.
        assert!(!range.matches(&v("2.0.0-rc.1")));
    }

    #[test]
    fn tilde_constraint_bounds() {
        let range = parse_constraint("~1.2.0").unwrap();
        assert!(range.matches(&v("1.2.0")));
        assert!(range.matches(&v("1.2.9")));
        assert!(!range.matches(&v("1.3.0")));
        assert!(!range.matches(&v("1.1.0")));
    }

    #[test]
    fn exact_constraint_excludes_prereleases() {
        let range = parse_constraint("1.2.3").unwrap();
        assert!(range.matches(&v("1.2.3")));
        assert!(range.matches(&v("1.2.3+build")));
        assert!(!range.matches(&v("1.2.3-alpha")));
        assert!(!range.matches(&v("1.2.4")));
    }

    #[test]
    fn wildcard_matches_everything() {
        let range = parse_constraint("*").unwrap();
        assert!(range.matches(&v("0.0.1")));
        assert!(range.matches(&v("9.9.9-beta")));
    }

    #[test]
    fn rejects_malformed_constraints() {
        for spec in ["", "^", "~", "abc", ">=1.2.3", "^1.2", "1.2.*"] {
            assert!(
                matches!(
                    parse_constraint(spec),
                    Err(VersionError::InvalidConstraint { .. })
                ),
                "accepted `{spec}`"
            );
        }
    }

    #[test]
    fn best_match_picks_highest_in_range() {
        let versions: Vec<Version> = ["1.0.0", "1.2.0", "1.2.5", "2.0.0"]
            .iter()
            .map(|s| v(s))
            .collect();
        let range = parse_constraint("^1.2.0").unwrap();
        assert_eq!(find_best_match(&versions, &range), Some(&v("1.2.5")));
    }

    #[test]
    fn best_match_returns_none_without_candidates() {
        let versions = vec![v("0.9.0"), v("2.1.0")];
        let range = parse_constraint("^1.0.0").unwrap();
        assert_eq!(find_best_match(&versions, &range), None);
    }

    #[test]
    fn best_match_prefers_release_over_prerelease() {
        let versions = vec![v("1.3.0-rc.1"), v("1.3.0")];
        let range = parse_constraint("^1.0.0").unwrap();
        assert_eq!(find_best_match(&versions, &range), Some(&v("1.3.0")));
    }

    #[test]
    fn best_match_is_deterministic_for_unordered_prereleases() {
        let forward = vec![v("1.3.0-alpha"), v("1.3.0-beta")];
        let reverse = vec![v("1.3.0-beta"), v("1.3.0-alpha")];
        let range = parse_constraint("*").unwrap();
        assert_eq!(
            find_best_match(&forward, &range),
            find_best_match(&reverse, &range)
        );
    }
}
