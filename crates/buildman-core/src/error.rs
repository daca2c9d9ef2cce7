//! Error types shared by every buildman crate.

use std::fmt;
use thiserror::Error;

/// 1-based position inside a manifest source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A structural problem found while mapping well-formed text onto the manifest model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// Where the offending declaration starts. `None` for missing sections.
    pub location: Option<Location>,
    pub message: String,
}

impl SchemaIssue {
    pub fn at(location: Location, message: impl Into<String>) -> Self {
        Self {
            location: Some(location),
            message: message.into(),
        }
    }

    pub fn missing_section(section: &str) -> Self {
        Self {
            location: None,
            message: format!("missing required section `{section}`"),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{loc}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Failed to parse manifest at {location}: {message}")]
    ParseError { location: Location, message: String },

    #[error("Invalid manifest: {}", join_issues(.issues))]
    SchemaError { issues: Vec<SchemaIssue> },

    #[error("Dependency '{module}' not found in manifest")]
    ModuleNotFound { module: String },

    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Unsupported manifest file: {path}")]
    UnsupportedFile { path: String },

    #[error("Cannot edit manifest: {message}")]
    UnsupportedEdit { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ManifestError {
    /// Returns the schema issues carried by a `SchemaError`, empty otherwise.
    pub fn issues(&self) -> &[SchemaIssue] {
        match self {
            Self::SchemaError { issues } => issues,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, ManifestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ManifestError::ParseError {
            location: Location::new(3, 14),
            message: "unterminated string".into(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to parse manifest at 3:14: unterminated string"
        );
    }

    #[test]
    fn test_schema_error_lists_every_issue() {
        let err = ManifestError::SchemaError {
            issues: vec![
                SchemaIssue::missing_section("dependencies"),
                SchemaIssue::at(Location::new(2, 5), "dependency `a:b` is missing a version"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("missing required section `dependencies`"));
        assert!(msg.contains("2:5: dependency `a:b` is missing a version"));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn test_issues_empty_for_other_variants() {
        let err = ManifestError::ModuleNotFound {
            module: "a:b".into(),
        };
        assert!(err.issues().is_empty());
        assert!(err.to_string().contains("a:b"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err: ManifestError = io_err.into();
        assert!(matches!(err, ManifestError::Io(_)));
    }
}
