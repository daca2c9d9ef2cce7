//! Maps a parsed build script onto [`BuildManifest`].
//!
//! Only top-level `plugins`, `repositories`, `dependencies` and test task
//! blocks contribute to the manifest. Everything else is skipped. Problems
//! are collected rather than returned early so that a single load reports
//! all of them.

use super::lexer::{StrLit, StrPart};
use super::syntax::{Arg, Block, Expr, Invocation, Segment, Stmt};
use super::{Source, Span};
use crate::error::{GradleError, Result};
use buildman_core::{
    BuildManifest, Coordinate, NotationError, Plugin, Repository, SchemaIssue, Scope,
    TestConfig, TestPlatform,
};
use std::collections::HashMap;

/// Where a dependency's version text lives in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum VersionTarget {
    /// The version characters of a plain string literal.
    Literal(Span),
    /// The version is exactly `$name`; `definition` indexes
    /// [`Analysis::definitions`] at the point the template was read.
    Variable { name: String, definition: usize },
    /// Escaped, concatenated or otherwise computed.
    Computed,
}

#[derive(Debug, Clone)]
pub(crate) struct VersionSite {
    pub(crate) scope: Scope,
    pub(crate) module: String,
    pub(crate) target: VersionTarget,
}

/// One `val`/`ext` definition. A redefinition is a separate entry.
#[derive(Debug, Clone)]
pub(crate) struct Variable {
    pub(crate) name: String,
    /// Resolved string value, `None` when it is not a string.
    pub(crate) value: Option<String>,
    /// Bytes between the quotes of the defining literal.
    pub(crate) content: Span,
    /// The literal has no escapes or templates and can be edited in place.
    pub(crate) plain: bool,
    /// How many string templates read this definition.
    pub(crate) uses: usize,
}

#[derive(Debug)]
pub(crate) struct Analysis {
    pub(crate) manifest: BuildManifest,
    pub(crate) sites: Vec<VersionSite>,
    pub(crate) definitions: Vec<Variable>,
}

const SKIPPED_NOTATIONS: &[&str] = &[
    "project",
    "files",
    "fileTree",
    "gradleApi",
    "localGroovy",
    "gradleTestKit",
];

const PLATFORM_WRAPPERS: &[&str] = &["platform", "enforcedPlatform", "testFixtures"];

const COLLECTION_BUILDERS: &[&str] = &[
    "setOf",
    "listOf",
    "mutableSetOf",
    "mutableListOf",
    "hashSetOf",
    "arrayOf",
];

pub(crate) fn extract(source: &Source<'_>, script: &[Stmt]) -> Result<Analysis> {
    let mut extractor = Extractor {
        source,
        manifest: BuildManifest::default(),
        sites: Vec::new(),
        definitions: Vec::new(),
        in_scope: HashMap::new(),
        issues: Vec::new(),
        seen_plugins: false,
        seen_dependencies: false,
    };

    for stmt in script {
        extractor.top_level(stmt);
    }

    if !extractor.seen_plugins {
        extractor.issues.push(SchemaIssue::missing_section("plugins"));
    }
    if !extractor.seen_dependencies {
        extractor
            .issues
            .push(SchemaIssue::missing_section("dependencies"));
    }

    if !extractor.issues.is_empty() {
        tracing::debug!("Found {} schema issue(s)", extractor.issues.len());
        return Err(GradleError::SchemaError {
            issues: extractor.issues,
        });
    }

    Ok(Analysis {
        manifest: extractor.manifest,
        sites: extractor.sites,
        definitions: extractor.definitions,
    })
}

struct Extractor<'s, 'a> {
    source: &'s Source<'a>,
    manifest: BuildManifest,
    sites: Vec<VersionSite>,
    definitions: Vec<Variable>,
    /// Name -> index of its latest definition.
    in_scope: HashMap<String, usize>,
    issues: Vec<SchemaIssue>,
    seen_plugins: bool,
    seen_dependencies: bool,
}

impl Expr {
    /// Segment names of a parenthesis-free path such as `TestLogEvent.PASSED`.
    fn plain_path(&self) -> Option<Vec<&str>> {
        match self {
            Self::Path(segments, _) if segments.iter().all(|s| s.args.is_none()) => {
                Some(segments.iter().map(|s| s.name.as_str()).collect())
            }
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match self.plain_path()?.as_slice() {
            ["true"] => Some(true),
            ["false"] => Some(false),
            _ => None,
        }
    }
}

fn first_arg(args: &[Arg]) -> Option<&Expr> {
    args.first().map(|arg| &arg.value)
}

fn named_arg<'x>(args: &'x [Arg], name: &str) -> Option<&'x Expr> {
    args.iter()
        .find(|arg| arg.name.as_deref() == Some(name))
        .map(|arg| &arg.value)
}

fn segment_args(segment: &Segment) -> &[Arg] {
    segment.args.as_deref().unwrap_or_default()
}

impl Extractor<'_, '_> {
    fn issue(&mut self, span: Span, message: impl Into<String>) {
        let location = self.source.location(span.start);
        self.issues.push(SchemaIssue::at(location, message));
    }

    /// Expands `$name` templates. Unknown variables are reported and yield `None`.
    fn resolve(&mut self, lit: &StrLit, span: Span) -> Option<String> {
        let mut out = String::new();
        for part in &lit.parts {
            match part {
                StrPart::Text(text) => out.push_str(text),
                StrPart::Var(name) => {
                    let value = self
                        .in_scope
                        .get(name.as_str())
                        .and_then(|&i| self.definitions.get_mut(i))
                        .and_then(|var| {
                            var.uses += 1;
                            var.value.clone()
                        });
                    match value {
                        Some(value) => out.push_str(&value),
                        None => {
                            self.issue(span, format!("cannot resolve template variable `{name}`"));
                            return None;
                        }
                    }
                }
            }
        }
        Some(out)
    }

    fn string_value(&mut self, expr: &Expr, what: &str) -> Option<String> {
        match expr {
            Expr::Str(lit, span) => self.resolve(lit, *span),
            other => {
                self.issue(other.span(), format!("expected a string literal for {what}"));
                None
            }
        }
    }

    /// Version characters of a literal, after `skip_colons` colons.
    fn literal_target(&self, lit: &StrLit, skip_colons: usize) -> VersionTarget {
        let raw = self.source.slice(lit.content);
        let offset = if lit.as_plain().as_deref() == Some(raw) {
            if skip_colons == 0 {
                0
            } else {
                match raw.match_indices(':').nth(skip_colons - 1) {
                    Some((i, _)) => i + 1,
                    None => return VersionTarget::Computed,
                }
            }
        } else if skip_colons > 0
            && let Some(StrPart::Text(tail)) = lit.parts.last()
            && let Some((_, version)) = tail.rsplit_once(':')
            && raw.ends_with(version)
        {
            // `"g:a_${suffix}:1.0"` keeps its version in a plain tail
            raw.len() - version.len()
        } else {
            return VersionTarget::Computed;
        };
        let version = &raw[offset..];
        let lead = version.len() - version.trim_start().len();
        let trail = version.len() - version.trim_end().len();
        VersionTarget::Literal(Span::new(
            lit.content.start + offset + lead,
            lit.content.end - trail,
        ))
    }

    fn version_target(&self, expr: &Expr, skip_colons: usize) -> VersionTarget {
        let Expr::Str(lit, _) = expr else {
            return VersionTarget::Computed;
        };
        match lit.parts.as_slice() {
            [StrPart::Var(name)] if skip_colons == 0 => self.variable_target(name),
            [StrPart::Text(prefix), StrPart::Var(name)]
                if skip_colons > 0
                    && prefix.ends_with(':')
                    && prefix.matches(':').count() == skip_colons =>
            {
                self.variable_target(name)
            }
            _ => self.literal_target(lit, skip_colons),
        }
    }

    fn variable_target(&self, name: &str) -> VersionTarget {
        match self.in_scope.get(name) {
            Some(&definition) => VersionTarget::Variable {
                name: name.to_string(),
                definition,
            },
            None => VersionTarget::Computed,
        }
    }

    fn define(&mut self, name: &str, value: &Expr) {
        let variable = match value {
            Expr::Str(lit, span) => {
                let resolved = if lit.parts.iter().any(|p| matches!(p, StrPart::Var(_))) {
                    self.resolve(lit, *span)
                } else {
                    lit.as_plain()
                };
                Variable {
                    name: name.to_string(),
                    plain: lit.as_plain().as_deref() == Some(self.source.slice(lit.content)),
                    value: resolved,
                    content: lit.content,
                    uses: 0,
                }
            }
            _ => Variable {
                name: name.to_string(),
                value: None,
                content: value.span(),
                plain: false,
                uses: 0,
            },
        };
        tracing::debug!("Defined variable `{}` = {:?}", name, variable.value);
        self.in_scope
            .insert(name.to_string(), self.definitions.len());
        self.definitions.push(variable);
    }

    fn top_level(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Skipped(_) => {}
            Stmt::Assign {
                target, value, local, ..
            } => match target.as_slice() {
                [name] if *local => self.define(name, value),
                [ext, name] if ext == "ext" => self.define(name, value),
                [project, ext, name] if project == "project" && ext == "ext" => {
                    self.define(name, value);
                }
                _ => tracing::debug!("Skipping assignment to `{}`", target.join(".")),
            },
            Stmt::Invoke(chain) => {
                let Some(head) = chain.first() else {
                    return;
                };
                let names = head.names();
                match (names.as_slice(), &head.block) {
                    (["plugins"], Some(block)) => self.plugins_block(block),
                    (["repositories"], Some(block)) => self.repositories_block(block),
                    (["dependencies"], Some(block)) => self.dependencies_block(block),
                    (["ext"], Some(block)) => self.ext_block(block),
                    (["tasks"], Some(block)) => self.tasks_block(block),
                    (["apply"], None) => self.apply_plugin(head),
                    (["test"], Some(block)) => self.test_block(block),
                    (["test", rest @ ..], _) => self.test_invocation(rest, head),
                    (["tasks", rest @ ..], _) => self.task_path(rest, head),
                    (path, _) => tracing::debug!("Skipping top-level `{}`", path.join(".")),
                }
            }
        }
    }

    fn ext_block(&mut self, block: &Block) {
        for stmt in block {
            if let Stmt::Assign { target, value, .. } = stmt
                && let [name] = target.as_slice()
            {
                self.define(name, value);
            }
        }
    }

    /// `apply plugin: 'java'` / `apply(plugin = "java")`
    fn apply_plugin(&mut self, inv: &Invocation) {
        let Some(expr) = named_arg(inv.args(), "plugin") else {
            tracing::debug!("Skipping `apply` without a plugin argument");
            return;
        };
        if let Some(id) = self.string_value(expr, "the plugin id") {
            tracing::debug!("Applied plugin `{}`", id);
            self.manifest.plugins.push(Plugin::new(id));
        }
        self.seen_plugins = true;
    }

    fn plugins_block(&mut self, block: &Block) {
        self.seen_plugins = true;
        for stmt in block {
            match stmt {
                Stmt::Invoke(chain) => self.plugin(chain),
                Stmt::Skipped(_) => {}
                Stmt::Assign { span, .. } => {
                    self.issue(*span, "unexpected assignment in `plugins` block");
                }
            }
        }
    }

    fn plugin(&mut self, chain: &[Invocation]) {
        let Some(head) = chain.first() else {
            return;
        };
        let Some(first) = head.segments.first() else {
            return;
        };

        let mut plugin = match first.name.as_str() {
            _ if head.segments.len() == 1 && head.is_bare() => Plugin::new(first.name.clone()),
            "id" => {
                let args = if head.segments.len() == 1 {
                    head.args()
                } else {
                    segment_args(first)
                };
                let Some(expr) = first_arg(args) else {
                    self.issue(head.span, "`id` needs a plugin id");
                    return;
                };
                match self.string_value(expr, "the plugin id") {
                    Some(id) => Plugin::new(id),
                    None => return,
                }
            }
            "kotlin" => {
                let Some(expr) = first_arg(segment_args(first)) else {
                    self.issue(head.span, "`kotlin` needs a plugin name");
                    return;
                };
                match self.string_value(expr, "the plugin name") {
                    Some(name) => Plugin::new(format!("org.jetbrains.kotlin.{name}")),
                    None => return,
                }
            }
            "alias" => {
                self.issue(head.span, "version catalog plugin aliases are not supported");
                return;
            }
            other => {
                self.issue(head.span, format!("unsupported plugin declaration `{other}`"));
                return;
            }
        };

        // `id("x").version("1").apply(false)`
        let mut modifiers: Vec<(&str, &[Arg], Span)> = head.segments[1..]
            .iter()
            .map(|s| (s.name.as_str(), segment_args(s), s.span))
            .collect();
        // `id("x") version "1" apply false`
        modifiers.extend(
            chain[1..]
                .iter()
                .filter_map(|link| Some((link.segments.first()?.name.as_str(), link.args(), link.span))),
        );

        for (name, args, span) in modifiers {
            let Some(value) = first_arg(args) else {
                self.issue(span, format!("`{name}` needs an argument"));
                continue;
            };
            match name {
                "version" => {
                    if let Some(version) = self.string_value(value, "the plugin version") {
                        plugin.version = Some(version);
                    }
                }
                "apply" => match value.as_bool() {
                    Some(apply) => plugin.apply = apply,
                    None => self.issue(value.span(), "`apply` expects `true` or `false`"),
                },
                other => {
                    self.issue(span, format!("unsupported plugin modifier `{other}`"));
                }
            }
        }

        tracing::debug!("Found plugin `{}`", plugin.id);
        self.manifest.plugins.push(plugin);
    }

    fn repositories_block(&mut self, block: &Block) {
        for stmt in block {
            let Stmt::Invoke(chain) = stmt else {
                continue;
            };
            let Some(head) = chain.first() else {
                continue;
            };
            let names = head.names();
            if let [name] = names.as_slice()
                && let Some(repo) = Repository::from_shorthand(name)
            {
                self.manifest.repositories.push(repo);
                continue;
            }
            match names.as_slice() {
                ["maven"] => {
                    if let Some(url) = self.repository_url(head) {
                        self.manifest.repositories.push(Repository::Maven { url });
                    }
                }
                ["ivy"] => {
                    if let Some(url) = self.repository_url(head) {
                        self.manifest.repositories.push(Repository::Ivy { url });
                    }
                }
                path => {
                    self.issue(
                        head.span,
                        format!("unsupported repository `{}`", path.join(".")),
                    );
                }
            }
        }
    }

    fn repository_url(&mut self, inv: &Invocation) -> Option<String> {
        let args = inv.args();
        if let Some(expr) = named_arg(args, "url").or_else(|| {
            args.iter()
                .find(|arg| arg.name.is_none())
                .map(|arg| &arg.value)
        }) {
            return self.url_value(expr);
        }

        for stmt in inv.block.iter().flatten() {
            match stmt {
                Stmt::Assign { target, value, .. } if target == &["url"] => {
                    return self.url_value(value);
                }
                Stmt::Invoke(chain) => {
                    let Some(head) = chain.first() else {
                        continue;
                    };
                    if matches!(head.names().as_slice(), ["url" | "setUrl"])
                        && let Some(expr) = first_arg(head.args())
                    {
                        return self.url_value(expr);
                    }
                }
                _ => {}
            }
        }

        let name = inv.names().join(".");
        self.issue(inv.span, format!("`{name}` repository has no url"));
        None
    }

    /// `"https://..."` or `uri("https://...")`
    fn url_value(&mut self, expr: &Expr) -> Option<String> {
        if let Expr::Path(segments, _) = expr
            && let [segment] = segments.as_slice()
            && matches!(segment.name.as_str(), "uri" | "url")
            && let Some(inner) = first_arg(segment_args(segment))
        {
            return self.string_value(inner, "the repository url");
        }
        self.string_value(expr, "the repository url")
    }

    fn dependencies_block(&mut self, block: &Block) {
        self.seen_dependencies = true;
        for stmt in block {
            let Stmt::Invoke(chain) = stmt else {
                continue;
            };
            let Some(head) = chain.first() else {
                continue;
            };
            let names = head.names();
            match names.as_slice() {
                // `add("implementation", "g:a:v")`
                ["add"] => {
                    let args = head.args();
                    let scope = args
                        .first()
                        .and_then(|arg| match &arg.value {
                            Expr::Str(lit, _) => lit.as_plain(),
                            _ => None,
                        });
                    match (scope, args.get(1)) {
                        (Some(scope), Some(arg)) => {
                            self.notation(&Scope::from(scope), &arg.value);
                        }
                        _ => self.issue(head.span, "`add` expects a configuration and a notation"),
                    }
                }
                [scope] => {
                    let args = head.args();
                    if args.is_empty() {
                        if head.block.is_some() {
                            tracing::debug!("Skipping `{}` block in dependencies", scope);
                        } else {
                            self.issue(
                                head.span,
                                format!("`{scope}` declares no dependency"),
                            );
                        }
                        continue;
                    }
                    self.dependency(&Scope::from(*scope), head.span, args);
                }
                path => tracing::debug!("Skipping `{}` in dependencies", path.join(".")),
            }
        }
    }

    fn dependency(&mut self, scope: &Scope, span: Span, args: &[Arg]) {
        if args.iter().any(|arg| arg.name.is_some()) {
            self.named_dependency(scope, span, args);
            return;
        }
        for arg in args {
            self.notation(scope, &arg.value);
        }
    }

    /// `group = "g", name = "a", version = "v"` or the Groovy map form.
    fn named_dependency(&mut self, scope: &Scope, span: Span, args: &[Arg]) {
        let group = named_arg(args, "group").and_then(|e| self.string_value(e, "`group`"));
        let name = named_arg(args, "name").and_then(|e| self.string_value(e, "`name`"));
        let (Some(group), Some(name)) = (group, name) else {
            self.issue(span, "dependency needs both `group` and `name`");
            return;
        };
        for (field, value) in [("group", &group), ("name", &name)] {
            if value.trim().is_empty() || value.contains([':', '@']) {
                self.issue(
                    span,
                    format!("`{field}` must be non-empty and free of `:` and `@`, got `{value}`"),
                );
                return;
            }
        }
        let Some(version_expr) = named_arg(args, "version") else {
            let err = NotationError::MissingVersion {
                module: format!("{group}:{name}"),
            };
            self.issue(span, err.to_string());
            return;
        };
        let Some(version) = self.string_value(version_expr, "`version`") else {
            return;
        };
        let target = self.version_target(version_expr, 0);
        self.push_dependency(scope, Coordinate::new(group, name, version), target);
    }

    fn notation(&mut self, scope: &Scope, expr: &Expr) {
        match expr {
            Expr::Str(lit, span) => {
                let Some(text) = self.resolve(lit, *span) else {
                    return;
                };
                match text.parse::<Coordinate>() {
                    Ok(coordinate) => {
                        let target = self.version_target(expr, 2);
                        self.push_dependency(scope, coordinate, target);
                    }
                    Err(err) => self.issue(*span, err.to_string()),
                }
            }
            Expr::List(items, _) => {
                for item in items {
                    self.notation(scope, item);
                }
            }
            Expr::Path(segments, span) => {
                let Some(first) = segments.first() else {
                    return;
                };
                let name = first.name.as_str();
                let args = segment_args(first);
                match name {
                    _ if PLATFORM_WRAPPERS.contains(&name) && segments.len() == 1 => {
                        match first_arg(args) {
                            Some(inner) => self.notation(scope, inner),
                            None => self.issue(*span, format!("`{name}` needs a notation")),
                        }
                    }
                    "kotlin" if segments.len() == 1 => self.kotlin_module(scope, *span, args),
                    _ if SKIPPED_NOTATIONS.contains(&name) => {
                        tracing::warn!(
                            "Skipping `{}` dependency in `{}`: not a module coordinate",
                            name,
                            scope
                        );
                    }
                    "libs" => self.issue(*span, "version catalog accessors are not supported"),
                    _ => self.issue(*span, format!("unsupported dependency notation `{name}`")),
                }
            }
            other => self.issue(other.span(), "unsupported dependency notation"),
        }
    }

    /// `kotlin("stdlib", "1.9.0")`
    fn kotlin_module(&mut self, scope: &Scope, span: Span, args: &[Arg]) {
        let Some(module) = first_arg(args).and_then(|e| self.string_value(e, "the module")) else {
            return;
        };
        let artifact = format!("kotlin-{module}");
        let version_expr = named_arg(args, "version").or_else(|| args.get(1).map(|a| &a.value));
        let Some(version_expr) = version_expr else {
            let err = NotationError::MissingVersion {
                module: format!("org.jetbrains.kotlin:{artifact}"),
            };
            self.issue(span, err.to_string());
            return;
        };
        let Some(version) = self.string_value(version_expr, "the version") else {
            return;
        };
        let target = self.version_target(version_expr, 0);
        self.push_dependency(
            scope,
            Coordinate::new("org.jetbrains.kotlin", artifact, version),
            target,
        );
    }

    fn push_dependency(&mut self, scope: &Scope, coordinate: Coordinate, target: VersionTarget) {
        tracing::debug!("Found dependency {} in `{}`", coordinate, scope);
        self.sites.push(VersionSite {
            scope: scope.clone(),
            module: coordinate.module(),
            target,
        });
        self.manifest
            .dependencies
            .push(scope.clone(), coordinate);
    }

    fn tasks_block(&mut self, block: &Block) {
        for stmt in block {
            if let Stmt::Invoke(chain) = stmt
                && let Some(head) = chain.first()
            {
                let names = head.names();
                self.task_path(&names, head);
            }
        }
    }

    /// Handles the part of a task reference after `tasks`.
    fn task_path(&mut self, path: &[&str], inv: &Invocation) {
        let Some((&task, rest)) = path.split_first() else {
            return;
        };
        let first = &inv.segments[inv.segments.len() - path.len()];

        let targets_test = match task {
            "test" => true,
            "named" | "getByName" => {
                matches!(first_arg(segment_args(first)), Some(Expr::Str(lit, _)) if lit.as_plain().as_deref() == Some("test"))
            }
            "withType" => {
                first.type_arg.as_deref() == Some("Test")
                    || first_arg(segment_args(first)).is_some_and(|e| self.is_test_type(e))
            }
            _ => false,
        };
        if !targets_test {
            tracing::debug!("Skipping task `{}`", path.join("."));
            return;
        }

        let rest = match rest {
            ["configureEach" | "configure", tail @ ..] if task != "test" => tail,
            _ => rest,
        };
        if rest.is_empty() {
            if let Some(block) = &inv.block {
                self.test_block(block);
            } else {
                self.test_config();
            }
        } else {
            self.test_invocation(rest, inv);
        }
    }

    fn is_test_type(&self, expr: &Expr) -> bool {
        match expr.plain_path() {
            Some(path) => path == ["Test"],
            None => self.source.slice(expr.span()).starts_with("Test::"),
        }
    }

    fn test_config(&mut self) -> &mut TestConfig {
        self.manifest.test_config.get_or_insert_default()
    }

    fn test_block(&mut self, block: &Block) {
        self.test_config();
        for stmt in block {
            match stmt {
                Stmt::Invoke(chain) => {
                    if let Some(head) = chain.first() {
                        let names = head.names();
                        self.test_invocation(&names, head);
                    }
                }
                Stmt::Assign { target, value, .. } => {
                    if target == &["testLogging", "events"] {
                        self.set_events(std::slice::from_ref(value));
                    }
                }
                Stmt::Skipped(_) => {}
            }
        }
    }

    /// A statement inside the test task, addressed by its path.
    fn test_invocation(&mut self, path: &[&str], inv: &Invocation) {
        self.test_config();
        let args = inv.args();
        match path {
            ["useJUnitPlatform"] => {
                self.test_config().platform = TestPlatform::JUnitPlatform;
                if let Some(block) = &inv.block {
                    self.platform_options(block);
                }
            }
            ["useJUnit"] => self.test_config().platform = TestPlatform::JUnit,
            ["useTestNG"] => self.test_config().platform = TestPlatform::TestNg,
            ["testLogging"] => {
                if let Some(block) = &inv.block {
                    self.logging_block(block);
                }
            }
            ["testLogging", "events"] => {
                let values: Vec<Expr> = args.iter().map(|a| a.value.clone()).collect();
                self.set_events(&values);
            }
            other => tracing::debug!("Skipping `{}` in test task", other.join(".")),
        }
    }

    fn platform_options(&mut self, block: &Block) {
        for stmt in block {
            let Stmt::Invoke(chain) = stmt else {
                continue;
            };
            let Some(head) = chain.first() else {
                continue;
            };
            match head.names().as_slice() {
                ["includeEngines"] => {
                    for arg in head.args() {
                        if let Some(engine) = self.string_value(&arg.value, "the engine id") {
                            self.test_config().engines.push(engine);
                        }
                    }
                }
                // the test DSL also accepts logging configuration here
                ["testLogging"] => {
                    if let Some(block) = &head.block {
                        self.logging_block(block);
                    }
                }
                path => tracing::debug!("Skipping JUnit Platform option `{}`", path.join(".")),
            }
        }
    }

    fn logging_block(&mut self, block: &Block) {
        for stmt in block {
            match stmt {
                Stmt::Invoke(chain) => {
                    if let Some(head) = chain.first()
                        && head.names() == ["events"]
                    {
                        let values: Vec<Expr> =
                            head.args().iter().map(|a| a.value.clone()).collect();
                        self.set_events(&values);
                    }
                }
                Stmt::Assign { target, value, .. } if target == &["events"] => {
                    self.set_events(std::slice::from_ref(value));
                }
                _ => {}
            }
        }
    }

    /// Events are replaced, not appended, matching Gradle's `events(...)` setter.
    fn set_events(&mut self, values: &[Expr]) {
        let mut events = Vec::new();
        for value in values {
            self.collect_events(value, &mut events);
        }
        tracing::debug!("Test logging events: {:?}", events);
        self.test_config().events = events;
    }

    fn collect_events(&mut self, expr: &Expr, out: &mut Vec<String>) {
        match expr {
            Expr::Str(..) => {
                if let Some(event) = self.string_value(expr, "the event") {
                    out.push(event.to_lowercase());
                }
            }
            Expr::List(items, _) => {
                for item in items {
                    self.collect_events(item, out);
                }
            }
            Expr::Path(segments, span) => match segments.as_slice() {
                [builder] if COLLECTION_BUILDERS.contains(&builder.name.as_str()) => {
                    for arg in segment_args(builder) {
                        self.collect_events(&arg.value, out);
                    }
                }
                // `TestLogEvent.PASSED` or a star-imported `PASSED`
                [.., last] if last.args.is_none() => out.push(last.name.to_lowercase()),
                _ => self.issue(*span, "unsupported test logging event"),
            },
            other => self.issue(other.span(), "unsupported test logging event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Dialect, analyze, load, load_with};
    use buildman_core::Location;

    const SCALA_KTS: &str = r#"plugins {
    java
    scala
}

repositories {
    mavenCentral()
}

dependencies {
    implementation("org.scala-lang:scala-library:2.12.17")
    testImplementation("org.scalatest:scalatest_2.12:3.2.16")
    testRuntimeOnly("org.scalatestplus:junit-5-9_2.12:3.2.16.0-M5")
}

tasks {
    test {
        useJUnitPlatform {
            includeEngines("scalatest")
            testLogging {
                events("passed", "skipped", "failed")
            }
        }
    }
}
"#;

    fn issues(text: &str, dialect: Dialect) -> Vec<SchemaIssue> {
        match load_with(text, dialect).unwrap_err() {
            GradleError::SchemaError { issues } => issues,
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_scala_build() {
        let manifest = load(SCALA_KTS).unwrap();
        let ids: Vec<_> = manifest.plugins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["java", "scala"]);
        assert_eq!(manifest.repositories, vec![Repository::MavenCentral]);
        assert_eq!(manifest.dependencies.len(), 3);
        assert_eq!(
            manifest.dependencies["implementation"][0],
            Coordinate::new("org.scala-lang", "scala-library", "2.12.17")
        );

        let test = manifest.test_config.unwrap();
        assert_eq!(test.platform, TestPlatform::JUnitPlatform);
        assert_eq!(test.engines, vec!["scalatest"]);
        assert_eq!(test.events, vec!["passed", "skipped", "failed"]);
    }

    #[test]
    fn test_missing_sections() {
        let issues = issues("repositories {\n    mavenCentral()\n}\n", Dialect::Kotlin);
        assert_eq!(
            issues,
            vec![
                SchemaIssue::missing_section("plugins"),
                SchemaIssue::missing_section("dependencies"),
            ]
        );
    }

    #[test]
    fn test_all_issues_collected_with_locations() {
        let text = "plugins {\n    java\n}\ndependencies {\n    implementation(\"junit:junit\")\n    testImplementation(libs.scalatest)\n}\n";
        let issues = issues(text, Dialect::Kotlin);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].location, Some(Location::new(5, 20)));
        assert_eq!(issues[0].message, "dependency `junit:junit` is missing a version");
        assert_eq!(issues[1].location, Some(Location::new(6, 24)));
        assert!(issues[1].message.contains("version catalog"));
    }

    #[test]
    fn test_plugin_forms() {
        let text = r#"plugins {
    `java-library`
    id("com.diffplug.spotless") version "6.25.0"
    id("org.x.y").version("1.0").apply(false)
    kotlin("jvm") version "1.9.24" apply false
}
dependencies {
}
"#;
        let manifest = load(text).unwrap();
        assert_eq!(manifest.plugins[0], Plugin::new("java-library"));
        assert_eq!(
            manifest.plugins[1],
            Plugin::new("com.diffplug.spotless").with_version("6.25.0")
        );
        assert_eq!(manifest.plugins[2].version.as_deref(), Some("1.0"));
        assert!(!manifest.plugins[2].apply);
        assert_eq!(manifest.plugins[3].id, "org.jetbrains.kotlin.jvm");
        assert!(!manifest.plugins[3].apply);
    }

    #[test]
    fn test_groovy_plugins_and_apply() {
        let text = "plugins {\n    id 'java'\n    id 'org.x' version '2.0' apply false\n}\napply plugin: 'scala'\ndependencies {\n}\n";
        let manifest = load_with(text, Dialect::Groovy).unwrap();
        let ids: Vec<_> = manifest.plugins.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["java", "org.x", "scala"]);
        assert_eq!(manifest.plugins[1].version.as_deref(), Some("2.0"));
        assert!(!manifest.plugins[1].apply);
    }

    #[test]
    fn test_apply_plugin_satisfies_plugins_section() {
        let text = "apply plugin: 'java'\ndependencies {\n}\n";
        let manifest = load_with(text, Dialect::Groovy).unwrap();
        assert_eq!(manifest.plugins, vec![Plugin::new("java")]);
    }

    #[test]
    fn test_repositories() {
        let text = r#"plugins {
}
repositories {
    mavenLocal()
    google()
    maven("https://a.example/repo")
    maven { url = uri("https://b.example/repo") }
    maven {
        name = "internal"
        setUrl("https://c.example/repo")
    }
    ivy { url = uri("https://d.example/ivy") }
}
dependencies {
}
"#;
        let manifest = load(text).unwrap();
        assert_eq!(
            manifest.repositories,
            vec![
                Repository::MavenLocal,
                Repository::Google,
                Repository::Maven {
                    url: "https://a.example/repo".into()
                },
                Repository::Maven {
                    url: "https://b.example/repo".into()
                },
                Repository::Maven {
                    url: "https://c.example/repo".into()
                },
                Repository::Ivy {
                    url: "https://d.example/ivy".into()
                },
            ]
        );
    }

    #[test]
    fn test_repository_without_url() {
        let text = "plugins {\n}\nrepositories {\n    maven {\n        name = \"x\"\n    }\n    jitpack()\n}\ndependencies {\n}\n";
        let issues = issues(text, Dialect::Kotlin);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("has no url"));
        assert!(issues[1].message.contains("unsupported repository `jitpack`"));
    }

    #[test]
    fn test_groovy_repositories() {
        let text = "plugins {\n}\nrepositories {\n    mavenCentral()\n    maven { url 'https://x.example' }\n}\ndependencies {\n}\n";
        let manifest = load_with(text, Dialect::Groovy).unwrap();
        assert_eq!(manifest.repositories.len(), 2);
        assert_eq!(
            manifest.repositories[1],
            Repository::Maven {
                url: "https://x.example".into()
            }
        );
    }

    #[test]
    fn test_dependency_notations() {
        let text = r#"plugins {
}
dependencies {
    implementation(platform("org.springframework.boot:spring-boot-dependencies:3.3.0"))
    implementation(group = "com.google.guava", name = "guava", version = "33.2.1-jre")
    implementation(kotlin("stdlib", "1.9.24"))
    implementation(project(":core"))
    implementation(files("lib/a.jar"))
    add("api", "org.slf4j:slf4j-api:2.0.13")
    testImplementation("org.junit.jupiter:junit-jupiter:5.10.2") {
        because("tests")
    }
    constraints {
        implementation("a:b:1")
    }
}
"#;
        let manifest = load(text).unwrap();
        let implementation = &manifest.dependencies["implementation"];
        assert_eq!(implementation.len(), 3);
        assert_eq!(implementation[0].artifact, "spring-boot-dependencies");
        assert_eq!(implementation[1].version, "33.2.1-jre");
        assert_eq!(
            implementation[2],
            Coordinate::new("org.jetbrains.kotlin", "kotlin-stdlib", "1.9.24")
        );
        assert_eq!(manifest.dependencies["api"].len(), 1);
        assert_eq!(manifest.dependencies["testImplementation"].len(), 1);
    }

    #[test]
    fn test_groovy_dependency_forms() {
        let text = "plugins {\n}\next {\n    scalaVersion = '2.13.14'\n}\ndependencies {\n    implementation \"org.scala-lang:scala-library:$scalaVersion\"\n    testImplementation group: 'org.scalatest', name: 'scalatest_2.13', version: '3.2.19'\n    runtimeOnly 'a:b:1', 'c:d:2'\n}\n";
        let manifest = load_with(text, Dialect::Groovy).unwrap();
        assert_eq!(
            manifest.dependencies["implementation"][0].version,
            "2.13.14"
        );
        assert_eq!(
            manifest.dependencies["testImplementation"][0].module(),
            "org.scalatest:scalatest_2.13"
        );
        assert_eq!(manifest.dependencies["runtimeOnly"].len(), 2);
    }

    #[test]
    fn test_named_form_rejects_notation_characters() {
        for (group, name) in [("a:x", "b"), ("a", "b@jar"), ("", "b"), ("a", " ")] {
            let text = format!(
                "plugins {{\n}}\ndependencies {{\n    implementation(group = \"{group}\", name = \"{name}\", version = \"1.0\")\n}}\n"
            );
            let issues = issues(&text, Dialect::Kotlin);
            assert_eq!(issues.len(), 1, "{group}:{name}");
            assert_eq!(issues[0].location, Some(Location::new(4, 5)));
            assert!(issues[0].message.contains("free of `:` and `@`"));
        }
    }

    #[test]
    fn test_unresolved_template() {
        let text = "plugins {\n}\ndependencies {\n    implementation(\"a:b:$missing\")\n}\n";
        let issues = issues(text, Dialect::Kotlin);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].message,
            "cannot resolve template variable `missing`"
        );
    }

    #[test]
    fn test_test_block_forms() {
        let forms = [
            "tasks.test {\n    useJUnitPlatform()\n}\n",
            "tasks.named<Test>(\"test\") {\n    useJUnitPlatform()\n}\n",
            "tasks.withType<Test> {\n    useJUnitPlatform()\n}\n",
            "tasks.withType<Test>().configureEach {\n    useJUnitPlatform()\n}\n",
            "tasks {\n    named(\"test\") {\n        useJUnitPlatform()\n    }\n}\n",
            "tasks.test.useJUnitPlatform()\n",
        ];
        for form in forms {
            let text = format!("plugins {{\n}}\ndependencies {{\n}}\n{form}");
            let manifest = load(&text).unwrap();
            assert_eq!(
                manifest.test_config.map(|t| t.platform),
                Some(TestPlatform::JUnitPlatform),
                "{form}"
            );
        }
    }

    #[test]
    fn test_groovy_test_block() {
        let text = "plugins {\n}\ndependencies {\n}\ntest {\n    useJUnitPlatform {\n        includeEngines 'scalatest', 'junit-jupiter'\n    }\n    testLogging {\n        events 'passed', 'FAILED'\n    }\n}\n";
        let test = load_with(text, Dialect::Groovy)
            .unwrap()
            .test_config
            .unwrap();
        assert_eq!(test.engines, vec!["scalatest", "junit-jupiter"]);
        assert_eq!(test.events, vec!["passed", "failed"]);
    }

    #[test]
    fn test_event_constants() {
        let text = "plugins {\n}\ndependencies {\n}\ntasks.test {\n    useTestNG()\n    testLogging {\n        events = setOf(TestLogEvent.PASSED, TestLogEvent.STANDARD_OUT)\n    }\n}\n";
        let test = load(text).unwrap().test_config.unwrap();
        assert_eq!(test.platform, TestPlatform::TestNg);
        assert_eq!(test.events, vec!["passed", "standard_out"]);
    }

    #[test]
    fn test_no_test_block() {
        let text = "plugins {\n}\ndependencies {\n}\n";
        assert!(load(text).unwrap().test_config.is_none());
    }

    #[test]
    fn test_other_tasks_ignored() {
        let text = "plugins {\n}\ndependencies {\n}\ntasks.named<Jar>(\"jar\") {\n    useJUnitPlatform()\n}\n";
        assert!(load(text).unwrap().test_config.is_none());
    }

    #[test]
    fn test_redefinition_is_a_new_definition() {
        let text = "val v = \"1.0\"\nplugins {\n}\ndependencies {\n    implementation(\"a:b:$v\")\n}\nval v = \"9.9\"\n";
        let analysis = analyze(text, Dialect::Kotlin).unwrap();
        assert_eq!(analysis.definitions.len(), 2);
        assert_eq!(
            analysis.sites[0].target,
            VersionTarget::Variable {
                name: "v".into(),
                definition: 0
            }
        );
        assert_eq!(analysis.definitions[0].uses, 1);
        assert_eq!(analysis.definitions[1].uses, 0);
    }

    #[test]
    fn test_version_sites() {
        let text = "val v = \"1.0\"\nplugins {\n}\ndependencies {\n    implementation(\"a:b:2.0\")\n    api(\"c:d:$v\")\n    runtimeOnly(\"e:f:${v}-x\")\n}\n";
        let analysis = analyze(text, Dialect::Kotlin).unwrap();
        assert_eq!(analysis.sites.len(), 3);

        let VersionTarget::Literal(span) = &analysis.sites[0].target else {
            panic!("expected literal target");
        };
        assert_eq!(&text[span.start..span.end], "2.0");
        assert_eq!(
            analysis.sites[1].target,
            VersionTarget::Variable {
                name: "v".into(),
                definition: 0
            }
        );
        assert_eq!(analysis.sites[2].target, VersionTarget::Computed);

        let var = &analysis.definitions[0];
        assert!(var.plain);
        assert_eq!(var.uses, 2);
        assert_eq!(&text[var.content.start..var.content.end], "1.0");
    }
}
