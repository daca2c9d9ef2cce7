use anyhow::{Context, Result};
use buildman_core::{ValidationConfig, validate_with};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use super::{EXIT_VIOLATIONS, load_manifest};

pub fn check(
    file: &Path,
    config: Option<&Path>,
    strict: bool,
    out: &mut impl Write,
) -> Result<ExitCode> {
    let mut settings = match config {
        Some(path) => ValidationConfig::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => ValidationConfig::default(),
    };
    settings.strict_versions |= strict;

    let manifest = load_manifest(file)?;
    let result = validate_with(&manifest, &settings);

    if result.is_valid() {
        writeln!(out, "{}: ok", file.display())?;
        return Ok(ExitCode::SUCCESS);
    }

    for violation in &result {
        writeln!(out, "{}: {violation}", file.display())?;
    }
    writeln!(out, "{} violation(s)", result.len())?;
    Ok(ExitCode::from(EXIT_VIOLATIONS))
}
