//! Subcommand implementations.
//!
//! Each command writes its primary output to the given writer and returns
//! the process exit code. Failures that prevent the command from running at
//! all (unreadable file, malformed script) are returned as errors.

mod check;
mod set_version;
mod show;

pub use check::check;
pub use set_version::set_version;
pub use show::show;

use anyhow::{Context, Result};
use buildman_core::{BuildManifest, ManifestError};
use buildman_gradle::{Dialect, GradleError, load_with};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use crate::cli::{Cli, Command};

/// Exit code for a manifest that loads but breaks an invariant.
pub const EXIT_VIOLATIONS: u8 = 1;
/// Exit code for anything that stops a command from running.
pub const EXIT_FAILURE: u8 = 2;

pub fn run(cli: Cli, out: &mut impl Write) -> Result<ExitCode> {
    match cli.command {
        Command::Check {
            file,
            config,
            strict,
        } => check(&file, config.as_deref(), strict, out),
        Command::Show { file, format } => show(&file, format, out),
        Command::SetVersion {
            file,
            module,
            version,
            scope,
            write,
        } => set_version(&file, &module, &version, scope.as_deref(), write, out),
    }
}

pub(crate) fn dialect_of(path: &Path) -> Result<Dialect> {
    Dialect::from_path(path).ok_or_else(|| {
        anyhow::Error::from(ManifestError::from(GradleError::UnsupportedFile {
            path: path.display().to_string(),
        }))
    })
}

pub(crate) fn read_script(path: &Path) -> Result<(String, Dialect)> {
    let dialect = dialect_of(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok((content, dialect))
}

/// Loads a manifest, reporting script errors with every schema issue spelled out.
pub(crate) fn load_manifest(path: &Path) -> Result<BuildManifest> {
    let (content, dialect) = read_script(path)?;
    tracing::debug!("loading {} as {:?}", path.display(), dialect);
    let manifest = load_with(&content, dialect)
        .map_err(ManifestError::from)
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::info!("loaded {}: {}", path.display(), summary(&manifest));
    Ok(manifest)
}

fn summary(manifest: &BuildManifest) -> String {
    format!(
        "{} plugin(s), {} repositor(ies), {} dependenc(ies) in {} scope(s)",
        manifest.plugins.len(),
        manifest.repositories.len(),
        manifest.dependencies.len(),
        manifest.dependencies.iter().count()
    )
}
