use anyhow::Result;
use buildman_gradle::{Dialect, render};
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use super::load_manifest;
use crate::cli::OutputFormat;

pub fn show(file: &Path, format: OutputFormat, out: &mut impl Write) -> Result<ExitCode> {
    let manifest = load_manifest(file)?;
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &manifest)?;
            writeln!(out)?;
        }
        OutputFormat::Kotlin => out.write_all(render(&manifest, Dialect::Kotlin).as_bytes())?,
        OutputFormat::Groovy => out.write_all(render(&manifest, Dialect::Groovy).as_bytes())?,
    }
    Ok(ExitCode::SUCCESS)
}
