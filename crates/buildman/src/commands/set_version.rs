use anyhow::{Context, Result};
use buildman_core::{ManifestError, Scope};
use buildman_gradle::update_version_with;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use super::read_script;

pub fn set_version(
    file: &Path,
    module: &str,
    version: &str,
    scope: Option<&str>,
    write: bool,
    out: &mut impl Write,
) -> Result<ExitCode> {
    let (content, dialect) = read_script(file)?;
    let scope = scope.map(Scope::from);

    let updated = update_version_with(&content, dialect, module, version, scope.as_ref())
        .map_err(ManifestError::from)
        .with_context(|| format!("failed to update {module} in {}", file.display()))?;

    if write {
        std::fs::write(file, &updated)
            .with_context(|| format!("failed to write {}", file.display()))?;
        tracing::info!("set {module} to {version} in {}", file.display());
    } else {
        out.write_all(updated.as_bytes())?;
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SCRIPT: &str = r#"plugins {
    java
}

dependencies {
    implementation("com.google.guava:guava:33.0.0-jre")
    testImplementation("org.junit.jupiter:junit-jupiter:5.10.0")
}
"#;

    #[test]
    fn test_set_version_in_place() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.gradle.kts");
        fs::write(&path, SCRIPT).unwrap();

        let mut out = Vec::new();
        set_version(
            &path,
            "com.google.guava:guava",
            "33.2.1-jre",
            None,
            true,
            &mut out,
        )
        .unwrap();
        assert!(out.is_empty());
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            SCRIPT.replace("33.0.0-jre", "33.2.1-jre")
        );
    }

    #[test]
    fn test_set_version_to_stdout_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.gradle.kts");
        fs::write(&path, SCRIPT).unwrap();

        let mut out = Vec::new();
        set_version(
            &path,
            "org.junit.jupiter:junit-jupiter",
            "5.11.0",
            Some("testImplementation"),
            false,
            &mut out,
        )
        .unwrap();
        assert!(String::from_utf8(out).unwrap().contains("junit-jupiter:5.11.0"));
        assert_eq!(fs::read_to_string(&path).unwrap(), SCRIPT);
    }

    #[test]
    fn test_unknown_module_in_scope() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.gradle.kts");
        fs::write(&path, SCRIPT).unwrap();

        let err = set_version(
            &path,
            "com.google.guava:guava",
            "33.2.1-jre",
            Some("testImplementation"),
            false,
            &mut Vec::new(),
        )
        .unwrap_err();
        let cause = err.downcast_ref::<ManifestError>().unwrap();
        assert!(matches!(cause, ManifestError::ModuleNotFound { .. }));
    }
}
