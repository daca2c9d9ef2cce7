//! Gradle build script loader.
//!
//! Loading runs in three passes over the source text:
//! 1. [`lexer`] turns the text into tokens, rejecting malformed literals,
//! 2. [`syntax`] builds a tree of invocations, blocks and assignments,
//!    rejecting unbalanced or unexpected tokens,
//! 3. [`extract`] maps the tree onto a [`BuildManifest`], collecting every
//!    schema problem it meets.
//!
//! The first two passes fail fast with `ParseError`; the third reports all
//! of its findings at once with `SchemaError`.

pub(crate) mod extract;
pub(crate) mod lexer;
pub(crate) mod syntax;

use crate::error::{GradleError, Result};
use buildman_core::{BuildManifest, Location};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Build script flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `build.gradle.kts`
    #[default]
    Kotlin,
    /// `build.gradle`
    Groovy,
}

impl Dialect {
    /// Picks the dialect from a file name, `None` for anything that is not a
    /// Gradle build script.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(".gradle.kts") {
            Some(Self::Kotlin)
        } else if name.ends_with(".gradle") {
            Some(Self::Groovy)
        } else {
            None
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kotlin => f.write_str("kotlin"),
            Self::Groovy => f.write_str("groovy"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kotlin" | "kts" => Ok(Self::Kotlin),
            "groovy" => Ok(Self::Groovy),
            other => Err(format!("unknown dialect `{other}`")),
        }
    }
}

/// Byte span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub(crate) struct Span {
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Span {
    pub(crate) const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub(crate) const fn to(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

/// Maps byte offsets to 1-based line/column locations.
pub struct LineOffsetTable {
    line_starts: Vec<usize>,
}

impl LineOffsetTable {
    pub fn new(content: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { line_starts }
    }

    pub fn location(&self, content: &str, offset: usize) -> Location {
        let offset = offset.min(content.len());
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let line_start = self.line_starts[line];
        let column = content
            .get(line_start..offset)
            .map_or(0, |prefix| prefix.chars().count());

        Location::new(line as u32 + 1, column as u32 + 1)
    }
}

/// Source text plus its line table, shared by the passes.
pub(crate) struct Source<'a> {
    pub(crate) text: &'a str,
    pub(crate) lines: LineOffsetTable,
    pub(crate) dialect: Dialect,
}

impl<'a> Source<'a> {
    pub(crate) fn new(text: &'a str, dialect: Dialect) -> Self {
        Self {
            text,
            lines: LineOffsetTable::new(text),
            dialect,
        }
    }

    pub(crate) fn location(&self, offset: usize) -> Location {
        self.lines.location(self.text, offset)
    }

    pub(crate) fn slice(&self, span: Span) -> &'a str {
        self.text.get(span.start..span.end).unwrap_or_default()
    }

    pub(crate) fn parse_error(&self, offset: usize, message: impl Into<String>) -> GradleError {
        GradleError::ParseError {
            location: self.location(offset),
            message: message.into(),
        }
    }
}

/// Loads a Kotlin DSL build script.
pub fn load(content: &str) -> Result<BuildManifest> {
    load_with(content, Dialect::Kotlin)
}

pub fn load_with(content: &str, dialect: Dialect) -> Result<BuildManifest> {
    analyze(content, dialect).map(|analysis| analysis.manifest)
}

/// Reads `path` and loads it with the dialect implied by its file name.
pub fn load_path(path: &Path) -> Result<BuildManifest> {
    let dialect = Dialect::from_path(path).ok_or_else(|| GradleError::UnsupportedFile {
        path: path.display().to_string(),
    })?;
    let content = std::fs::read_to_string(path)?;
    tracing::debug!("Loading {} build script {:?}", dialect, path);
    load_with(&content, dialect)
}

/// Runs every pass and keeps the source bookkeeping needed for edits.
pub(crate) fn analyze(content: &str, dialect: Dialect) -> Result<extract::Analysis> {
    let source = Source::new(content, dialect);
    let tokens = lexer::tokenize(&source)?;
    let script = syntax::parse(&source, tokens)?;
    extract::extract(&source, &script)
}
