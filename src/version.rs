//! Runtime version parsing, ordering and range matching.
//!
//! Installed versions come from directory names, `--version` output and
//! feed entries, so they are messy (`v20.11.0`, `20.11`, `node-v18.0.0`).
//! Ordering uses a lenient three-component numeric comparator where a
//! missing or unparsable component counts as 0. Range matching for
//! `engines` fields goes through `node-semver`, which implements npm's
//! range grammar.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Strip surrounding whitespace, a `node-` prefix and a leading `v`.
pub fn normalize(version: &str) -> String {
    let trimmed = version.trim();
    let trimmed = trimmed.strip_prefix("node-").unwrap_or(trimmed);
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
        .to_string()
}

/// Parse the leading digits of a component; anything else is 0.
fn component(part: Option<&str>) -> u64 {
    part.map(|p| {
        let digits: String = p.chars().take_while(|c| c.is_ascii_digit()).collect();
        digits.parse().unwrap_or(0)
    })
    .unwrap_or(0)
}

/// Split a version into `[major, minor, patch]`, defaulting missing parts to 0.
pub fn components(version: &str) -> [u64; 3] {
    let normalized = normalize(version);
    let mut parts = normalized.split('.');
    [
        component(parts.next()),
        component(parts.next()),
        component(parts.next()),
    ]
}

/// Compare two versions component by component.
pub fn compare(a: &str, b: &str) -> Ordering {
    components(a).cmp(&components(b))
}

/// Major version, if the string starts with a number.
pub fn major(version: &str) -> Option<u64> {
    let normalized = normalize(version);
    let first = normalized.split('.').next()?;
    if first.is_empty() || !first.chars().next()?.is_ascii_digit() {
        return None;
    }
    Some(component(Some(first)))
}

/// Whether a string looks like a concrete version (`18`, `v20.1.0`).
pub fn looks_like_version(value: &str) -> bool {
    let normalized = normalize(value);
    !normalized.is_empty()
        && normalized
            .split('.')
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Shape of an npm range expression, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeKind {
    /// `18.2.0`
    Exact,
    /// `^18.2.0`
    Caret,
    /// `~18.2.0`
    Tilde,
    /// `*`, `x`, `18.x`
    Wildcard,
    /// `>=18 <21`, `18 || 20`, `18 - 20`
    Range,
}

/// Classify a range expression.
pub fn range_kind(range: &str) -> RangeKind {
    let range = range.trim();
    if range.is_empty() || range == "*" || range.contains(['x', 'X', '*']) {
        RangeKind::Wildcard
    } else if range.starts_with('^') && !range.contains(' ') {
        RangeKind::Caret
    } else if range.starts_with('~') && !range.contains(' ') {
        RangeKind::Tilde
    } else if looks_like_version(range) {
        RangeKind::Exact
    } else {
        RangeKind::Range
    }
}

/// Whether `version` satisfies the npm range `range`.
///
/// Returns `None` when either side cannot be parsed.
pub fn satisfies(range: &str, version: &str) -> Option<bool> {
    let range = node_semver::Range::parse(range.trim()).ok()?;
    let [maj, min, pat] = components(version);
    let normalized = format!("{}.{}.{}", maj, min, pat);
    let version = node_semver::Version::parse(normalized.as_str()).ok()?;
    Some(range.satisfies(&version))
}

/// Lowest major version a range can match, used to compare declared
/// engines against the running runtime.
pub fn range_floor_major(range: &str) -> Option<u64> {
    range
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter(|token| !token.is_empty())
        .find_map(major)
}
