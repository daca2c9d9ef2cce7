//! Invariant checks over a loaded [`BuildManifest`].
//!
//! Every check runs to completion; the result carries all violations found.

use crate::config::{ValidationConfig, module_matches};
use crate::types::{BuildManifest, Scope, TestPlatform};
use crate::version::check_version;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    DuplicateDependency,
    InvalidVersion,
    DuplicatePlugin,
    InvalidPluginVersion,
    UnprovidedEngine,
    DuplicateEngine,
    EnginesWithoutPlatform,
    UnknownTestEvent,
    DuplicateTestEvent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Scope of the offending dependency, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
    /// The coordinate, plugin, engine or event the violation is about.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "[{scope}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    pub violations: Vec<Violation>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Violation> {
        self.violations.iter()
    }

    pub fn of_kind(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }

    fn push(
        &mut self,
        kind: ViolationKind,
        scope: Option<&Scope>,
        subject: impl Into<String>,
        message: String,
    ) {
        self.violations.push(Violation {
            kind,
            scope: scope.cloned(),
            subject: subject.into(),
            message,
        });
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a Violation;
    type IntoIter = std::slice::Iter<'a, Violation>;

    fn into_iter(self) -> Self::IntoIter {
        self.violations.iter()
    }
}

/// Validates `manifest` with the default configuration.
pub fn validate(manifest: &BuildManifest) -> ValidationResult {
    validate_with(manifest, &ValidationConfig::default())
}

pub fn validate_with(manifest: &BuildManifest, config: &ValidationConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_dependencies(manifest, config, &mut result);
    check_plugins(manifest, config, &mut result);
    check_test_config(manifest, config, &mut result);

    tracing::debug!(
        violations = result.len(),
        dependencies = manifest.dependencies.len(),
        "Validated manifest"
    );
    result
}

fn check_dependencies(
    manifest: &BuildManifest,
    config: &ValidationConfig,
    result: &mut ValidationResult,
) {
    for (scope, deps) in manifest.dependencies.iter() {
        // module -> versions declared for it, in order of first appearance
        let mut seen: BTreeMap<String, Vec<&str>> = BTreeMap::new();
        let mut order = Vec::new();

        for dep in deps {
            if let Err(reason) = check_version(&dep.version, config.strict_versions) {
                result.push(
                    ViolationKind::InvalidVersion,
                    Some(scope),
                    dep.to_string(),
                    format!("{}: invalid version '{}': {reason}", dep.module(), dep.version),
                );
            }

            let module = dep.module();
            let versions = seen.entry(module.clone()).or_default();
            if versions.is_empty() {
                order.push(module);
            }
            versions.push(&dep.version);
        }

        for module in order {
            let versions = &seen[&module];
            if versions.len() < 2 {
                continue;
            }
            let message = if versions.iter().all(|v| *v == versions[0]) {
                format!(
                    "{module}:{} is declared {} times",
                    versions[0],
                    versions.len()
                )
            } else {
                format!(
                    "{module} is declared with conflicting versions: {}",
                    versions.join(", ")
                )
            };
            result.push(
                ViolationKind::DuplicateDependency,
                Some(scope),
                format!("{module}:{}", versions[0]),
                message,
            );
        }
    }
}

fn check_plugins(
    manifest: &BuildManifest,
    config: &ValidationConfig,
    result: &mut ValidationResult,
) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();

    for plugin in &manifest.plugins {
        if !seen.insert(plugin.id.as_str()) && reported.insert(plugin.id.as_str()) {
            result.push(
                ViolationKind::DuplicatePlugin,
                None,
                plugin.id.clone(),
                format!("plugin `{}` is declared more than once", plugin.id),
            );
        }
        if let Some(version) = &plugin.version
            && let Err(reason) = check_version(version, config.strict_versions)
        {
            result.push(
                ViolationKind::InvalidPluginVersion,
                None,
                plugin.id.clone(),
                format!("plugin `{}`: invalid version '{version}': {reason}", plugin.id),
            );
        }
    }
}

fn check_test_config(
    manifest: &BuildManifest,
    config: &ValidationConfig,
    result: &mut ValidationResult,
) {
    let Some(test) = &manifest.test_config else {
        return;
    };

    let modules: Vec<String> = manifest
        .dependencies
        .all()
        .map(|(_, dep)| dep.module())
        .collect();

    if !test.engines.is_empty() && test.platform != TestPlatform::JUnitPlatform {
        result.push(
            ViolationKind::EnginesWithoutPlatform,
            None,
            test.engines.join(", "),
            format!(
                "engines {} are included but the test task does not use the JUnit Platform",
                test.engines.join(", ")
            ),
        );
    }

    let mut seen = HashSet::new();
    for engine in &test.engines {
        if !seen.insert(engine.as_str()) {
            result.push(
                ViolationKind::DuplicateEngine,
                None,
                engine.clone(),
                format!("engine `{engine}` is included more than once"),
            );
            continue;
        }
        if !engine_is_provided(engine, &modules, config) {
            result.push(
                ViolationKind::UnprovidedEngine,
                None,
                engine.clone(),
                format!("engine `{engine}` is not provided by any declared dependency"),
            );
        }
    }

    let mut seen = HashSet::new();
    for event in &test.events {
        if !config.is_allowed_event(event) {
            result.push(
                ViolationKind::UnknownTestEvent,
                None,
                event.clone(),
                format!("unknown test logging event `{event}`"),
            );
        } else if !seen.insert(event.as_str()) {
            result.push(
                ViolationKind::DuplicateTestEvent,
                None,
                event.clone(),
                format!("test logging event `{event}` is listed more than once"),
            );
        }
    }
}

/// An engine is provided when a declared module matches one of its provider
/// patterns. Engines without an entry in the table are never provided.
fn engine_is_provided(engine: &str, modules: &[String], config: &ValidationConfig) -> bool {
    config.providers(engine).is_some_and(|patterns| {
        modules
            .iter()
            .any(|module| patterns.iter().any(|p| module_matches(p, module)))
    })
}
