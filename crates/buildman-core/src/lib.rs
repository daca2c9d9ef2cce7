//! Core abstractions for buildman: the build manifest model, errors and
//! invariant validation.
//!
//! Parsing of concrete build-script dialects lives in `buildman-gradle`;
//! this crate only knows about the loaded, immutable [`BuildManifest`].

pub mod config;
pub mod error;
pub mod types;
pub mod validate;
pub mod version;

pub use config::ValidationConfig;
pub use error::{Location, ManifestError, Result, SchemaIssue};
pub use types::{
    BuildManifest, Coordinate, Dependencies, NotationError, Plugin, Repository, Scope,
    TestConfig, TestPlatform,
};
pub use validate::{ValidationResult, Violation, ViolationKind, validate, validate_with};
