//! Canonical text form of a [`BuildManifest`].
//!
//! The output is a minimal build script that loads back into an equal
//! manifest. Formatting is fixed: four-space indentation, one declaration per
//! line, sections in the order plugins, repositories, dependencies, test task.

use crate::parser::Dialect;
use buildman_core::{BuildManifest, Coordinate, Plugin, Repository, Scope, TestConfig, TestPlatform};
use std::fmt::Write;

const INDENT: &str = "    ";

/// Words that start a non-invocation statement when written bare or in backticks.
const STATEMENT_KEYWORDS: &[&str] = &["import", "package", "val", "var", "def"];

/// Renders `manifest` as a build script in the given dialect.
///
/// # Examples
///
/// ```
/// use buildman_core::{BuildManifest, Coordinate, Plugin, Scope};
/// use buildman_gradle::{Dialect, render};
///
/// let mut manifest = BuildManifest::default();
/// manifest.plugins.push(Plugin::new("java"));
/// manifest
///     .dependencies
///     .push(Scope::Implementation, Coordinate::new("com.google.guava", "guava", "33.2.1-jre"));
///
/// let text = render(&manifest, Dialect::Kotlin);
/// assert!(text.contains("implementation(\"com.google.guava:guava:33.2.1-jre\")"));
/// ```
pub fn render(manifest: &BuildManifest, dialect: Dialect) -> String {
    let mut writer = Writer {
        dialect,
        out: String::new(),
        depth: 0,
    };
    writer.plugins(&manifest.plugins);
    if !manifest.repositories.is_empty() {
        writer.out.push('\n');
        writer.repositories(&manifest.repositories);
    }
    writer.out.push('\n');
    writer.dependencies(manifest);
    if let Some(test) = &manifest.test_config {
        writer.out.push('\n');
        writer.test_task(test);
    }
    writer.out
}

struct Writer {
    dialect: Dialect,
    out: String,
    depth: usize,
}

impl Writer {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, header: &str) {
        self.line(&format!("{header} {{"));
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    fn quote(&self, value: &str) -> String {
        let (quote, escape_dollar) = match self.dialect {
            Dialect::Kotlin => ('"', true),
            Dialect::Groovy => ('\'', false),
        };
        let mut out = String::with_capacity(value.len() + 2);
        out.push(quote);
        for c in value.chars() {
            match c {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '$' if escape_dollar => out.push_str("\\$"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(quote);
        out
    }

    /// `name(args)` in Kotlin, `name args` in Groovy.
    fn call(&self, name: &str, args: &[String]) -> String {
        match self.dialect {
            Dialect::Kotlin => format!("{name}({})", args.join(", ")),
            Dialect::Groovy => format!("{name} {}", args.join(", ")),
        }
    }

    fn plugins(&mut self, plugins: &[Plugin]) {
        self.open("plugins");
        for plugin in plugins {
            let line = self.plugin(plugin);
            self.line(&line);
        }
        self.close();
    }

    fn plugin(&self, plugin: &Plugin) -> String {
        let plain = plugin.is_core()
            && plugin.version.is_none()
            && plugin.apply
            && !plugin.id.is_empty()
            && !STATEMENT_KEYWORDS.contains(&plugin.id.as_str());
        if plain && self.dialect == Dialect::Kotlin {
            if is_identifier(&plugin.id) {
                return plugin.id.clone();
            }
            if !plugin.id.contains(['`', '\n']) {
                return format!("`{}`", plugin.id);
            }
        }

        let mut line = self.call("id", &[self.quote(&plugin.id)]);
        if let Some(version) = &plugin.version {
            let _ = write!(line, " version {}", self.quote(version));
        }
        if !plugin.apply {
            line.push_str(" apply false");
        }
        line
    }

    fn repositories(&mut self, repositories: &[Repository]) {
        self.open("repositories");
        for repo in repositories {
            let line = match repo {
                Repository::Maven { url } => self.repository_block("maven", url),
                Repository::Ivy { url } => self.repository_block("ivy", url),
                other => format!("{}()", other.shorthand().unwrap_or_default()),
            };
            self.line(&line);
        }
        self.close();
    }

    fn repository_block(&self, kind: &str, url: &str) -> String {
        match self.dialect {
            Dialect::Kotlin => format!("{kind} {{ url = uri({}) }}", self.quote(url)),
            Dialect::Groovy => format!("{kind} {{ url {} }}", self.quote(url)),
        }
    }

    fn dependencies(&mut self, manifest: &BuildManifest) {
        self.open("dependencies");
        let mut first = true;
        for (scope, deps) in manifest.dependencies.iter() {
            if deps.is_empty() {
                continue;
            }
            if !first {
                self.out.push('\n');
            }
            first = false;
            for dep in deps {
                let line = self.dependency(scope, dep);
                self.line(&line);
            }
        }
        self.close();
    }

    fn dependency(&self, scope: &Scope, dep: &Coordinate) -> String {
        let notation = self.quote(&dep.to_string());
        if is_identifier(scope.as_str()) {
            self.call(scope.as_str(), &[notation])
        } else {
            // configurations whose names are not identifiers
            format!("add({}, {notation})", self.quote(scope.as_str()))
        }
    }

    fn test_task(&mut self, test: &TestConfig) {
        match self.dialect {
            Dialect::Kotlin => {
                self.open("tasks");
                self.open("test");
            }
            Dialect::Groovy => self.open("test"),
        }

        let logging_nested = test.platform == TestPlatform::JUnitPlatform
            && self.dialect == Dialect::Kotlin;
        match test.platform {
            TestPlatform::JUnitPlatform => {
                let has_options =
                    !test.engines.is_empty() || (logging_nested && !test.events.is_empty());
                if has_options {
                    self.open("useJUnitPlatform");
                    if !test.engines.is_empty() {
                        let engines: Vec<String> =
                            test.engines.iter().map(|e| self.quote(e)).collect();
                        let line = self.call("includeEngines", &engines);
                        self.line(&line);
                    }
                    if logging_nested {
                        self.test_logging(&test.events);
                    }
                    self.close();
                } else {
                    self.line("useJUnitPlatform()");
                }
            }
            TestPlatform::JUnit => self.line("useJUnit()"),
            TestPlatform::TestNg => self.line("useTestNG()"),
            TestPlatform::None => {}
        }
        if !logging_nested {
            self.test_logging(&test.events);
        }

        while self.depth > 0 {
            self.close();
        }
    }

    fn test_logging(&mut self, events: &[String]) {
        if events.is_empty() {
            return;
        }
        let events: Vec<String> = events.iter().map(|e| self.quote(e)).collect();
        self.open("testLogging");
        let line = self.call("events", &events);
        self.line(&line);
        self.close();
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
