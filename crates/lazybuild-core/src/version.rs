//! Maven version ordering and pre-release detection.

use std::cmp::Ordering;

/// Detects if a Maven version string is a pre-release.
///
/// Qualifiers: SNAPSHOT, alpha, beta, rc, M (milestone).
pub fn is_prerelease(version: &str) -> bool {
    let v = version.to_uppercase();
    v.contains("-SNAPSHOT")
        || v.contains("-ALPHA")
        || v.contains("-BETA")
        || v.contains("-RC")
        || v.contains(".RC")
        || contains_milestone_qualifier(&v)
}

fn contains_milestone_qualifier(upper: &str) -> bool {
    // -M followed by digits: -M1, -M10
    let bytes = upper.as_bytes();
    for i in 0..bytes.len().saturating_sub(1) {
        if bytes[i] == b'-' && bytes[i + 1] == b'M' {
            let rest = &upper[i + 2..];
            if rest.is_empty() || rest.starts_with(|c: char| c.is_ascii_digit()) {
                return true;
            }
        }
    }
    false
}

/// Compares two Maven version strings.
///
/// Splits on `.` and `-`, compares numeric segments numerically and other
/// segments lexicographically. Trailing zeros of a numeric run are ignored
/// (`1.0` == `1.0.0`). A release sorts above its own pre-releases
/// (`1.0.0` > `1.0.0-beta`).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = split_version(a);
    let b_parts = split_version(b);

    let max_len = a_parts.len().max(b_parts.len());
    for i in 0..max_len {
        let ord = match (a_parts.get(i), b_parts.get(i)) {
            (Some(ap), Some(bp)) => compare_segment(ap, bp),
            (Some(ap), None) => trailing_segment_order(ap),
            (None, Some(bp)) => trailing_segment_order(bp).reverse(),
            (None, None) => Ordering::Equal,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

/// Picks the higher of two versions, preferring `a` on ties.
pub fn max_version<'a>(a: &'a str, b: &'a str) -> &'a str {
    if compare_versions(b, a) == Ordering::Greater {
        b
    } else {
        a
    }
}

fn split_version(v: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    // zero segments held back until a non-zero number follows them
    let mut zeros = 0;
    for part in v.split(['.', '-']).filter(|s| !s.is_empty()) {
        match part.parse::<u64>() {
            Ok(0) => {
                zeros += 1;
                continue;
            }
            Ok(_) => parts.extend(std::iter::repeat_n("0", zeros)),
            Err(_) => {}
        }
        zeros = 0;
        parts.push(part);
    }
    parts
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(an), Ok(bn)) => an.cmp(&bn),
        (Ok(_), Err(_)) => Ordering::Greater,
        (Err(_), Ok(_)) => Ordering::Less,
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}

/// Order of a version that has an extra segment over an otherwise equal one.
fn trailing_segment_order(extra: &str) -> Ordering {
    if extra.parse::<u64>().is_ok() {
        Ordering::Greater
    } else {
        Ordering::Less
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prerelease_detection() {
        assert!(is_prerelease("1.0.0-SNAPSHOT"));
        assert!(is_prerelease("1.0.0-alpha"));
        assert!(is_prerelease("3.0.0-beta.3"));
        assert!(is_prerelease("5.0.0-beta.24"));
        assert!(is_prerelease("1.0.0-rc1"));
        assert!(is_prerelease("2.0.0-M1"));
        assert!(is_prerelease("2.0.0-M10"));
    }

    #[test]
    fn test_stable_versions() {
        assert!(!is_prerelease("1.0.0"));
        assert!(!is_prerelease("42.7.7"));
        assert!(!is_prerelease("1.2.3.Final"));
        assert!(!is_prerelease("a97f2fedd5"));
    }

    #[test]
    fn test_version_comparison() {
        assert_eq!(compare_versions("1.0.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.1", "1.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0", "1.0.1"), Ordering::Less);
        assert_eq!(compare_versions("2.0.0", "1.9.9"), Ordering::Greater);
        assert_eq!(compare_versions("10.0.0", "9.0.0"), Ordering::Greater);
        assert_eq!(compare_versions("11.11.2", "11.9.0"), Ordering::Greater);
    }

    #[test]
    fn test_release_above_prerelease() {
        assert_eq!(compare_versions("3.0.0", "3.0.0-beta.3"), Ordering::Greater);
        assert_eq!(compare_versions("3.0.0-beta.3", "3.0.0"), Ordering::Less);
        assert_eq!(compare_versions("1.0.0.1", "1.0.0"), Ordering::Greater);
    }

    #[test]
    fn test_trailing_zeros_are_equal() {
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0-beta", "1.0.0-beta"), Ordering::Equal);
        assert_eq!(compare_versions("1.0.1", "1.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0.0.1", "1.0"), Ordering::Greater);
        assert_eq!(compare_versions("1.0", "1.0-SNAPSHOT"), Ordering::Greater);
        assert_eq!(max_version("1.0", "1.0.0"), "1.0");
    }

    #[test]
    fn test_max_version() {
        assert_eq!(max_version("4.1.2", "4.2.0"), "4.2.0");
        assert_eq!(max_version("42.7.7", "42.6.0"), "42.7.7");
        assert_eq!(max_version("1.0", "1.0"), "1.0");
    }
}
