//! Errors specific to Gradle build script handling.

use buildman_core::{Location, ManifestError, SchemaIssue};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GradleError {
    #[error("Failed to parse Gradle script at {location}: {message}")]
    ParseError { location: Location, message: String },

    #[error("Gradle script does not describe a valid manifest ({} issue(s))", .issues.len())]
    SchemaError { issues: Vec<SchemaIssue> },

    #[error("Dependency '{module}' is not declared")]
    ModuleNotFound { module: String },

    #[error("Invalid version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    #[error("Cannot rewrite version: {message}")]
    UnsupportedEdit { message: String },

    #[error("Not a Gradle build script: {path}")]
    UnsupportedFile { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GradleError>;

impl From<GradleError> for ManifestError {
    fn from(err: GradleError) -> Self {
        match err {
            GradleError::ParseError { location, message } => Self::ParseError { location, message },
            GradleError::SchemaError { issues } => Self::SchemaError { issues },
            GradleError::ModuleNotFound { module } => Self::ModuleNotFound { module },
            GradleError::InvalidVersion { version, message } => {
                Self::InvalidVersion { version, message }
            }
            GradleError::UnsupportedEdit { message } => Self::UnsupportedEdit { message },
            GradleError::UnsupportedFile { path } => Self::UnsupportedFile { path },
            GradleError::Io(e) => Self::Io(e),
        }
    }
}
