//! Validation settings.
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! strict_versions = false
//! allowed_events = ["passed", "skipped", "failed"]
//!
//! [engine_providers]
//! scalatest = ["org.scalatestplus:junit-5-*"]
//! ```
//!
//! Missing keys fall back to [`ValidationConfig::default`]. Entries in
//! `engine_providers` are merged over the built-in table.

use crate::error::{ManifestError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Gradle `TestLogEvent` names, lower-cased.
pub const TEST_LOG_EVENTS: &[&str] = &[
    "started",
    "passed",
    "skipped",
    "failed",
    "standard_out",
    "standard_error",
];

const DEFAULT_ENGINE_PROVIDERS: &[(&str, &[&str])] = &[
    ("scalatest", &["org.scalatestplus:junit-5-*"]),
    (
        "junit-jupiter",
        &[
            "org.junit.jupiter:junit-jupiter-engine",
            "org.junit.jupiter:junit-jupiter",
        ],
    ),
    ("junit-vintage", &["org.junit.vintage:junit-vintage-engine"]),
    (
        "junit-platform-suite",
        &[
            "org.junit.platform:junit-platform-suite-engine",
            "org.junit.platform:junit-platform-suite",
        ],
    ),
    ("kotest", &["io.kotest:kotest-runner-junit5*"]),
    ("spek2", &["org.spekframework.spek2:spek-runner-junit5"]),
    ("jqwik", &["net.jqwik:jqwik-engine", "net.jqwik:jqwik"]),
    ("cucumber", &["io.cucumber:cucumber-junit-platform-engine"]),
    ("testng", &["org.junit.support:testng-engine"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Require every version to be SemVer 2.0 instead of SemVer-like.
    pub strict_versions: bool,
    /// Engine id -> dependency module patterns that provide it.
    /// A trailing `*` makes the pattern a prefix match.
    pub engine_providers: BTreeMap<String, Vec<String>>,
    pub allowed_events: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_versions: false,
            engine_providers: default_engine_providers(),
            allowed_events: TEST_LOG_EVENTS.iter().map(|e| (*e).to_string()).collect(),
        }
    }
}

fn default_engine_providers() -> BTreeMap<String, Vec<String>> {
    DEFAULT_ENGINE_PROVIDERS
        .iter()
        .map(|(engine, patterns)| {
            (
                (*engine).to_string(),
                patterns.iter().map(|p| (*p).to_string()).collect(),
            )
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawConfig {
    strict_versions: Option<bool>,
    engine_providers: BTreeMap<String, Vec<String>>,
    allowed_events: Option<Vec<String>>,
}

impl ValidationConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let raw: RawConfig =
            toml_edit::de::from_str(content).map_err(|e| ManifestError::Config {
                message: e.to_string(),
            })?;

        let mut config = Self::default();
        if let Some(strict) = raw.strict_versions {
            config.strict_versions = strict;
        }
        if let Some(events) = raw.allowed_events {
            config.allowed_events = events.into_iter().map(|e| e.to_lowercase()).collect();
        }
        for (engine, patterns) in raw.engine_providers {
            if patterns.iter().any(|p| !p.contains(':')) {
                return Err(ManifestError::Config {
                    message: format!(
                        "engine `{engine}`: provider patterns must look like `group:artifact`"
                    ),
                });
            }
            config.engine_providers.insert(engine, patterns);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded validation config from {:?}", path);
        Self::from_toml_str(&content)
    }

    /// Provider patterns for `engine`, if the engine is known.
    pub fn providers(&self, engine: &str) -> Option<&[String]> {
        self.engine_providers.get(engine).map(Vec::as_slice)
    }

    pub fn is_allowed_event(&self, event: &str) -> bool {
        self.allowed_events.iter().any(|e| e == event)
    }
}

/// Matches a `group:artifact` module against a provider pattern.
pub fn module_matches(pattern: &str, module: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => module.starts_with(prefix),
        None => pattern == module,
    }
}
