//! Gradle build script support for buildman.
//!
//! Loads `build.gradle.kts` (Kotlin DSL) and `build.gradle` (Groovy DSL)
//! scripts into [`buildman_core::BuildManifest`], renders manifests back to
//! canonical script text and rewrites dependency versions in place.

pub mod edit;
pub mod error;
pub mod parser;
pub mod writer;

pub use edit::{update_version, update_version_with};
pub use error::{GradleError, Result};
pub use parser::{Dialect, LineOffsetTable, load, load_path, load_with};
pub use writer::render;
