//! npm-style version ranges on top of `semver`.
//!
//! Installed versions and ranges come from npm manifests, so ranges use
//! npm's grammar rather than Cargo's:
//!
//! - `||` separates alternatives; any alternative may match
//! - whitespace separates comparators that must all match (`>= 1.2 < 2`)
//! - a bare version is an exact match, partial versions match the omitted
//!   parts freely (`1.2` is `1.2.x`)
//! - `a - b` is an inclusive hyphen range
//! - `x`, `X` and `*` are wildcards
//!
//! Each alternative is mapped onto a [`semver::VersionReq`].
//!
//! ```
//! use addon_checker::range::VersionRange;
//!
//! let range = VersionRange::parse(">= 2.0.0").unwrap();
//! assert!(range.satisfies("3.0.0"));
//! assert!(!range.satisfies("1.9.9"));
//!
//! let exact = VersionRange::parse("2.0.0").unwrap();
//! assert!(!exact.satisfies("2.0.1"));
//! ```

use semver::{BuildMetadata, Version, VersionReq};

use crate::error::{Error, Result};

const OPERATORS: [&str; 8] = [">=", "<=", ">", "<", "=", "~>", "~", "^"];

/// A parsed npm-style range.
#[derive(Debug, Clone)]
pub struct VersionRange {
    alternatives: Vec<VersionReq>,
    raw: String,
}

impl VersionRange {
    /// Parse an npm-style range.
    pub fn parse(range: &str) -> Result<Self> {
        let raw = range.to_string();
        let invalid = |reason: String| Error::InvalidRange {
            range: raw.clone(),
            reason,
        };

        let alternatives = range
            .split("||")
            .map(|alternative| {
                let translated = translate_alternative(alternative).map_err(&invalid)?;
                VersionReq::parse(&translated).map_err(|e| invalid(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { alternatives, raw })
    }

    /// Whether `version` is inside the range.
    pub fn matches(&self, version: &Version) -> bool {
        self.alternatives.iter().any(|req| req.matches(version))
    }

    /// Whether the version string is inside the range. Unparseable
    /// versions are never inside.
    pub fn satisfies(&self, version: &str) -> bool {
        parse_version(version).is_some_and(|v| self.matches(&v))
    }

    /// The range as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for VersionRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Parse an installed version leniently, the way npm reads manifests:
/// surrounding whitespace and a leading `v` or `=` are ignored, and build
/// metadata does not take part in comparisons.
pub fn parse_version(version: &str) -> Option<Version> {
    let trimmed = version.trim().trim_start_matches('=').trim_start();
    let trimmed = trimmed.strip_prefix(['v', 'V']).unwrap_or(trimmed);
    let mut parsed = Version::parse(trimmed).ok()?;
    parsed.build = BuildMetadata::EMPTY;
    Some(parsed)
}

/// Translate one `||` alternative into Cargo requirement syntax.
fn translate_alternative(alternative: &str) -> std::result::Result<String, String> {
    let alternative = alternative.trim();

    if let Some((low, high)) = alternative.split_once(" - ") {
        let low = partial(low.trim())?;
        let high = partial(high.trim())?;
        let mut comparators = Vec::new();
        if let Some(low) = low {
            comparators.push(format!(">={low}"));
        }
        if let Some(high) = high {
            comparators.push(format!("<={high}"));
        }
        return Ok(join(comparators));
    }

    let mut comparators = Vec::new();
    let mut pending_op: Option<&str> = None;
    for token in alternative.split_whitespace() {
        if let Some(op) = OPERATORS.iter().find(|op| token == **op) {
            if pending_op.replace(op).is_some() {
                return Err(format!("operator without version near '{token}'"));
            }
            continue;
        }

        let (op, version) = match pending_op.take() {
            Some(op) => (op, token),
            None => split_operator(token),
        };
        let op = match op {
            "" => "=",
            "~>" => "~",
            other => other,
        };

        if let Some(version) = partial(version)? {
            comparators.push(format!("{op}{version}"));
        }
    }

    if let Some(op) = pending_op {
        return Err(format!("operator '{op}' without version"));
    }
    Ok(join(comparators))
}

fn split_operator(token: &str) -> (&str, &str) {
    OPERATORS
        .iter()
        .find_map(|op| token.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", token))
}

/// Normalize a possibly partial version. `None` means "any version".
fn partial(version: &str) -> std::result::Result<Option<String>, String> {
    let version = version.strip_prefix(['v', 'V']).unwrap_or(version);
    if version.is_empty() {
        return Err("empty version".to_string());
    }

    let (core, suffix) = match version.find(['-', '+']) {
        Some(idx) => version.split_at(idx),
        None => (version, ""),
    };

    let mut parts = Vec::new();
    for part in core.split('.') {
        if matches!(part, "x" | "X" | "*") {
            break;
        }
        parts.push(part);
    }

    if parts.is_empty() {
        return Ok(None);
    }
    if parts.len() < 3 && !suffix.is_empty() {
        return Err(format!("pre-release on partial version '{version}'"));
    }
    Ok(Some(format!("{}{}", parts.join("."), suffix)))
}

fn join(comparators: Vec<String>) -> String {
    if comparators.is_empty() {
        "*".to_string()
    } else {
        comparators.join(", ")
    }
}
