//! Version string syntax checks.
//!
//! Two levels are supported:
//! - lenient: semantic-version-like identifiers as found in Maven/Gradle
//!   builds (`2.12.17`, `33.0.0-jre`, `3.2.16.0-M5`, `1.0.0-SNAPSHOT`)
//! - strict: the version must parse as a SemVer 2.0 version

use regex::Regex;
use std::sync::OnceLock;

static RE_VERSION_LIKE: OnceLock<Regex> = OnceLock::new();

fn re_version_like() -> &'static Regex {
    RE_VERSION_LIKE.get_or_init(|| {
        Regex::new(r"^[0-9]+(\.[0-9]+)*([.+\-][0-9A-Za-z]+)*$").expect("static regex is valid")
    })
}

/// Returns `true` for semantic-version-like identifiers.
///
/// # Examples
///
/// ```
/// use buildman_core::version::is_version_like;
///
/// assert!(is_version_like("3.2.19"));
/// assert!(is_version_like("3.2.16.0-M5"));
/// assert!(!is_version_like("latest.release"));
/// assert!(!is_version_like(""));
/// ```
pub fn is_version_like(version: &str) -> bool {
    re_version_like().is_match(version)
}

/// Checks `version` and describes what is wrong with it.
pub fn check_version(version: &str, strict: bool) -> Result<(), String> {
    if version.trim().is_empty() {
        return Err("version is empty".into());
    }
    if version.trim() != version {
        return Err("version has surrounding whitespace".into());
    }
    if version.ends_with('+') || version.starts_with('[') || version.starts_with('(') {
        return Err("dynamic versions and ranges are not allowed".into());
    }
    if strict {
        return semver::Version::parse(version)
            .map(|_| ())
            .map_err(|e| format!("not a SemVer version: {e}"));
    }
    if is_version_like(version) {
        Ok(())
    } else {
        Err("not a semantic-version-like identifier".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_jvm_versions_are_accepted() {
        for v in [
            "2.12.17",
            "3.2.19",
            "1.9.1",
            "33.0.0-jre",
            "3.2.16.0-M5",
            "1.0.0-SNAPSHOT",
            "5.10.0.RC1",
            "1.0.0+build.5",
            "17",
        ] {
            assert!(check_version(v, false).is_ok(), "{v} should be accepted");
        }
    }

    #[test]
    fn test_garbage_is_rejected() {
        for v in ["", " ", "latest.release", "v1.0", "1..2", "1.0-", "1.+", "[1.0,2.0)"] {
            assert!(check_version(v, false).is_err(), "{v:?} should be rejected");
        }
    }

    #[test]
    fn test_whitespace_is_reported() {
        let err = check_version(" 1.0.0", false).unwrap_err();
        assert!(err.contains("whitespace"));
    }

    #[test]
    fn test_strict_requires_semver() {
        assert!(check_version("3.2.19", true).is_ok());
        assert!(check_version("1.0.0-rc.1", true).is_ok());
        assert!(check_version("3.2.16.0-M5", true).is_err());
        assert!(check_version("17", true).is_err());
    }
}
