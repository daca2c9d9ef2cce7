//! Domain types for build manifests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// A `(group, artifact, version)` dependency coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Module identity: "{group}:{artifact}"
    pub fn module(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }

    pub fn matches_module(&self, module: &str) -> bool {
        module
            .split_once(':')
            .is_some_and(|(g, a)| g == self.group && a == self.artifact)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

/// Why a string could not be read as `group:artifact:version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotationError {
    MissingVersion { module: String },
    Malformed,
    Unsupported,
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVersion { module } => {
                write!(f, "dependency `{module}` is missing a version")
            }
            Self::Malformed => f.write_str("expected `group:artifact:version`"),
            Self::Unsupported => {
                f.write_str("classifier and extension suffixes are not supported")
            }
        }
    }
}

impl std::error::Error for NotationError {}

impl FromStr for Coordinate {
    type Err = NotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains('@') {
            return Err(NotationError::Unsupported);
        }
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        match parts.as_slice() {
            [group, artifact] | [group, artifact, ""]
                if !group.is_empty() && !artifact.is_empty() =>
            {
                Err(NotationError::MissingVersion {
                    module: format!("{group}:{artifact}"),
                })
            }
            [group, artifact, version]
                if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
            {
                Ok(Self::new(*group, *artifact, *version))
            }
            [_, _, _, _] => Err(NotationError::Unsupported),
            _ => Err(NotationError::Malformed),
        }
    }
}

/// Gradle configuration a dependency is declared in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Scope {
    Implementation,
    Api,
    CompileOnly,
    RuntimeOnly,
    AnnotationProcessor,
    TestImplementation,
    TestCompileOnly,
    TestRuntimeOnly,
    Custom(String),
}

impl Scope {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Implementation => "implementation",
            Self::Api => "api",
            Self::CompileOnly => "compileOnly",
            Self::RuntimeOnly => "runtimeOnly",
            Self::AnnotationProcessor => "annotationProcessor",
            Self::TestImplementation => "testImplementation",
            Self::TestCompileOnly => "testCompileOnly",
            Self::TestRuntimeOnly => "testRuntimeOnly",
            Self::Custom(name) => name,
        }
    }

    /// Whether the configuration only contributes to test source sets.
    pub fn is_test(&self) -> bool {
        matches!(
            self,
            Self::TestImplementation | Self::TestCompileOnly | Self::TestRuntimeOnly
        )
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        match s {
            "implementation" => Self::Implementation,
            "api" => Self::Api,
            "compileOnly" => Self::CompileOnly,
            "runtimeOnly" => Self::RuntimeOnly,
            "annotationProcessor" => Self::AnnotationProcessor,
            "testImplementation" => Self::TestImplementation,
            "testCompileOnly" => Self::TestCompileOnly,
            "testRuntimeOnly" => Self::TestRuntimeOnly,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Scope> for String {
    fn from(scope: Scope) -> Self {
        scope.as_str().to_string()
    }
}

impl FromStr for Scope {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dependencies grouped by scope, in scope order.
///
/// Entries keep declaration order within a scope, duplicates included, so
/// that validation can report them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dependencies(BTreeMap<Scope, Vec<Coordinate>>);

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, scope: Scope, coordinate: Coordinate) {
        self.0.entry(scope).or_default().push(coordinate);
    }

    /// Looks a scope up by its Gradle name, e.g. `"testImplementation"`.
    pub fn get(&self, scope: &str) -> Option<&[Coordinate]> {
        self.0.get(&Scope::from(scope)).map(Vec::as_slice)
    }

    pub fn scope(&self, scope: &Scope) -> Option<&[Coordinate]> {
        self.0.get(scope).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Scope, &[Coordinate])> {
        self.0.iter().map(|(scope, deps)| (scope, deps.as_slice()))
    }

    /// Every coordinate with its scope, flattened.
    pub fn all(&self) -> impl Iterator<Item = (&Scope, &Coordinate)> {
        self.0
            .iter()
            .flat_map(|(scope, deps)| deps.iter().map(move |dep| (scope, dep)))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Replaces the version of every coordinate matching `module`.
    /// Returns how many coordinates changed.
    pub fn set_version(&mut self, module: &str, version: &str, scope: Option<&Scope>) -> usize {
        let mut changed = 0;
        for (s, deps) in &mut self.0 {
            if scope.is_some_and(|wanted| wanted != s) {
                continue;
            }
            for dep in deps.iter_mut().filter(|d| d.matches_module(module)) {
                dep.version = version.to_string();
                changed += 1;
            }
        }
        changed
    }
}

impl Index<&str> for Dependencies {
    type Output = [Coordinate];

    fn index(&self, scope: &str) -> &Self::Output {
        self.get(scope).unwrap_or(&[])
    }
}

/// An enabled plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default = "default_apply")]
    pub apply: bool,
}

const fn default_apply() -> bool {
    true
}

impl Plugin {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: None,
            apply: true,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Core plugins (`java`, `scala`, `java-library`) have no namespace.
    pub fn is_core(&self) -> bool {
        !self.id.contains('.')
    }
}

/// A package source consulted during dependency resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Repository {
    MavenCentral,
    #[serde(rename = "jcenter")]
    JCenter,
    Google,
    MavenLocal,
    GradlePluginPortal,
    Maven { url: String },
    Ivy { url: String },
}

impl Repository {
    /// Shorthand builder name for the well-known repositories.
    pub fn shorthand(&self) -> Option<&'static str> {
        match self {
            Self::MavenCentral => Some("mavenCentral"),
            Self::JCenter => Some("jcenter"),
            Self::Google => Some("google"),
            Self::MavenLocal => Some("mavenLocal"),
            Self::GradlePluginPortal => Some("gradlePluginPortal"),
            Self::Maven { .. } | Self::Ivy { .. } => None,
        }
    }

    pub fn from_shorthand(name: &str) -> Option<Self> {
        match name {
            "mavenCentral" => Some(Self::MavenCentral),
            "jcenter" => Some(Self::JCenter),
            "google" => Some(Self::Google),
            "mavenLocal" => Some(Self::MavenLocal),
            "gradlePluginPortal" => Some(Self::GradlePluginPortal),
            _ => None,
        }
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maven { url } => write!(f, "maven({url})"),
            Self::Ivy { url } => write!(f, "ivy({url})"),
            other => write!(f, "{}()", other.shorthand().unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestPlatform {
    #[default]
    None,
    #[serde(rename = "junitPlatform")]
    JUnitPlatform,
    JUnit,
    TestNg,
}

/// Test task configuration: engines to include and lifecycle events to log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    #[serde(default)]
    pub platform: TestPlatform,
    #[serde(default)]
    pub engines: Vec<String>,
    /// Lower-cased event names in declaration order.
    #[serde(default)]
    pub events: Vec<String>,
}

/// The declarative description of a build.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub plugins: Vec<Plugin>,
    #[serde(default)]
    pub repositories: Vec<Repository>,
    pub dependencies: Dependencies,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_config: Option<TestConfig>,
}

impl BuildManifest {
    pub fn plugin(&self, id: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|p| p.id == id)
    }

    /// Returns a copy with every matching dependency pinned to `version`.
    pub fn with_version(&self, module: &str, version: &str) -> Self {
        let mut next = self.clone();
        next.dependencies.set_version(module, version, None);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_from_notation() {
        let c: Coordinate = "org.scalatest:scalatest_3:3.2.19".parse().unwrap();
        assert_eq!(c.group, "org.scalatest");
        assert_eq!(c.artifact, "scalatest_3");
        assert_eq!(c.version, "3.2.19");
        assert_eq!(c.module(), "org.scalatest:scalatest_3");
        assert_eq!(c.to_string(), "org.scalatest:scalatest_3:3.2.19");
    }

    #[test]
    fn test_coordinate_missing_version() {
        let err = "junit:junit".parse::<Coordinate>().unwrap_err();
        assert_eq!(
            err,
            NotationError::MissingVersion {
                module: "junit:junit".into()
            }
        );
        let err = "junit:junit:".parse::<Coordinate>().unwrap_err();
        assert!(matches!(err, NotationError::MissingVersion { .. }));
    }

    #[test]
    fn test_coordinate_rejects_classifier_and_garbage() {
        assert_eq!(
            "a:b:1.0:sources".parse::<Coordinate>().unwrap_err(),
            NotationError::Unsupported
        );
        assert_eq!(
            "a:b:1.0@jar".parse::<Coordinate>().unwrap_err(),
            NotationError::Unsupported
        );
        assert_eq!(
            "justaname".parse::<Coordinate>().unwrap_err(),
            NotationError::Malformed
        );
        assert_eq!(
            ":b:1.0".parse::<Coordinate>().unwrap_err(),
            NotationError::Malformed
        );
    }

    #[test]
    fn test_scope_names() {
        assert_eq!(Scope::from("testRuntimeOnly"), Scope::TestRuntimeOnly);
        assert_eq!(Scope::from("kapt"), Scope::Custom("kapt".into()));
        assert_eq!(Scope::TestImplementation.to_string(), "testImplementation");
        assert!(Scope::TestCompileOnly.is_test());
        assert!(!Scope::Api.is_test());
    }

    #[test]
    fn test_dependencies_index_by_name() {
        let mut deps = Dependencies::new();
        let c = Coordinate::new("org.scalatest", "scalatest_3", "3.2.19");
        deps.push(Scope::TestImplementation, c.clone());

        assert_eq!(&deps["testImplementation"], &[c]);
        assert!(deps["implementation"].is_empty());
        assert!(deps.get("implementation").is_none());
        assert_eq!(deps.len(), 1);
    }

    #[test]
    fn test_dependencies_keep_scope_order() {
        let mut deps = Dependencies::new();
        deps.push(Scope::TestRuntimeOnly, Coordinate::new("a", "b", "1"));
        deps.push(Scope::Implementation, Coordinate::new("c", "d", "2"));
        let scopes: Vec<_> = deps.iter().map(|(s, _)| s.clone()).collect();
        assert_eq!(scopes, vec![Scope::Implementation, Scope::TestRuntimeOnly]);
    }

    #[test]
    fn test_set_version_respects_scope() {
        let mut deps = Dependencies::new();
        deps.push(Scope::Implementation, Coordinate::new("a", "b", "1"));
        deps.push(Scope::TestImplementation, Coordinate::new("a", "b", "1"));

        assert_eq!(deps.set_version("a:b", "2", Some(&Scope::Implementation)), 1);
        assert_eq!(deps["implementation"][0].version, "2");
        assert_eq!(deps["testImplementation"][0].version, "1");
        assert_eq!(deps.set_version("a:b", "3", None), 2);
        assert_eq!(deps.set_version("x:y", "3", None), 0);
    }

    #[test]
    fn test_manifest_json_shape() {
        let mut manifest = BuildManifest {
            plugins: vec![Plugin::new("scala")],
            repositories: vec![Repository::MavenCentral],
            ..Default::default()
        };
        manifest.dependencies.push(
            Scope::Implementation,
            Coordinate::new("org.scala-lang", "scala-library", "2.13.14"),
        );
        manifest.test_config = Some(TestConfig {
            platform: TestPlatform::JUnitPlatform,
            engines: vec!["scalatest".into()],
            events: vec!["passed".into()],
        });

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["plugins"][0]["id"], "scala");
        assert_eq!(json["repositories"][0]["kind"], "mavenCentral");
        assert_eq!(
            json["dependencies"]["implementation"][0]["artifact"],
            "scala-library"
        );
        assert_eq!(json["testConfig"]["platform"], "junitPlatform");

        let back: BuildManifest = serde_json::from_value(json).unwrap();
        assert_eq!(back, manifest);
    }

    #[test]
    fn test_repository_shorthand() {
        assert_eq!(
            Repository::from_shorthand("mavenCentral"),
            Some(Repository::MavenCentral)
        );
        assert_eq!(Repository::from_shorthand("flatDir"), None);
        assert_eq!(Repository::JCenter.to_string(), "jcenter()");
    }
}
