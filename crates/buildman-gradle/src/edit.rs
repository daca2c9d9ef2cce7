//! In-place version edits.
//!
//! Edits touch only the characters of the version itself; comments,
//! formatting and unrelated declarations are preserved byte for byte.

use crate::error::{GradleError, Result};
use crate::parser::extract::{Analysis, VersionTarget};
use crate::parser::{Dialect, Span, analyze};
use buildman_core::Scope;
use buildman_core::version::check_version;

/// Rewrites the version of every declaration of `module` (`group:artifact`)
/// in a Kotlin DSL script, optionally restricted to one `scope`.
pub fn update_version(
    source: &str,
    module: &str,
    new_version: &str,
    scope: Option<&Scope>,
) -> Result<String> {
    update_version_with(source, Dialect::Kotlin, module, new_version, scope)
}

/// Like [`update_version`], for either dialect.
///
/// A version taken from a `$variable` is changed at the variable's definition,
/// as long as no other declaration reads that variable.
pub fn update_version_with(
    source: &str,
    dialect: Dialect,
    module: &str,
    new_version: &str,
    scope: Option<&Scope>,
) -> Result<String> {
    check_version(new_version, false).map_err(|message| GradleError::InvalidVersion {
        version: new_version.to_string(),
        message,
    })?;

    let analysis = analyze(source, dialect)?;
    let spans = edit_spans(&analysis, module, scope)?;

    let mut out = source.to_string();
    for span in spans.iter().rev() {
        out.replace_range(span.start..span.end, new_version);
    }

    tracing::debug!(
        "Updated {} version site(s) of {} to {}",
        spans.len(),
        module,
        new_version
    );
    Ok(out)
}

/// Sorted, deduplicated spans to overwrite.
fn edit_spans(analysis: &Analysis, module: &str, scope: Option<&Scope>) -> Result<Vec<Span>> {
    let sites: Vec<_> = analysis
        .sites
        .iter()
        .filter(|site| site.module == module)
        .filter(|site| scope.is_none_or(|wanted| *wanted == site.scope))
        .collect();

    if sites.is_empty() {
        let module = match scope {
            Some(scope) => format!("{module} (in `{scope}`)"),
            None => module.to_string(),
        };
        return Err(GradleError::ModuleNotFound { module });
    }

    let mut spans = Vec::with_capacity(sites.len());
    for site in &sites {
        let span = match &site.target {
            VersionTarget::Literal(span) => *span,
            VersionTarget::Variable { name, definition } => {
                let var = analysis
                    .definitions
                    .get(*definition)
                    .filter(|var| var.plain)
                    .ok_or_else(|| GradleError::UnsupportedEdit {
                        message: format!("`${name}` is not defined by a plain string literal"),
                    })?;
                let readers = sites
                    .iter()
                    .filter(|s| {
                        matches!(&s.target, VersionTarget::Variable { definition: d, .. } if d == definition)
                    })
                    .count();
                if var.uses > readers {
                    return Err(GradleError::UnsupportedEdit {
                        message: format!(
                            "`${}` is shared with other declarations; edit it directly",
                            var.name
                        ),
                    });
                }
                var.content
            }
            VersionTarget::Computed => {
                return Err(GradleError::UnsupportedEdit {
                    message: format!("the version of {module} in `{}` is computed", site.scope),
                });
            }
        };
        spans.push(span);
    }

    spans.sort();
    spans.dedup();
    Ok(spans)
}
