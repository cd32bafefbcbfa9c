//! Install command
//!
//! For each requested name: search every backend, keep only exact name
//! matches, pick the backend (automatically when only one matches,
//! otherwise through a [`SourceSelector`]), install, and record where the
//! package came from.

pub mod selection;

use crate::commands::report::{BatchReport, Outcome};
use crate::commands::search::search_all;
use crate::core::matcher::filter_exact_matches;
use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::traits::AppContext;
use crate::ui as output;
use crate::utils::sanitize::validate_package_name;
use selection::{NonInteractiveSelector, PromptSelector, SourceSelector};
use tracing::{info, warn};

pub struct InstallOptions {
    pub packages: Vec<String>,
    /// Only consider this backend
    pub from: Option<Source>,
    /// Reinstall packages that are already tracked
    pub force: bool,
    /// Non-interactive: ambiguous matches are skipped
    pub yes: bool,
}

/// Knobs of [`resolve_and_install`] that do not depend on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOptions {
    pub from: Option<Source>,
    pub force: bool,
}

pub fn run(ctx: &AppContext, options: InstallOptions) -> Result<()> {
    let resolve = ResolveOptions {
        from: options.from,
        force: options.force,
    };
    let report = if options.yes {
        resolve_and_install(ctx, &options.packages, &NonInteractiveSelector, resolve)?
    } else {
        resolve_and_install(ctx, &options.packages, &PromptSelector, resolve)?
    };

    report.render();
    report.into_result()
}

/// Resolve and install each name in turn.
///
/// Per-package problems (no match, ambiguous choice, backend failure)
/// are recorded in the report and the batch continues. A failure to
/// write the package list aborts with an error.
pub fn resolve_and_install(
    ctx: &AppContext,
    names: &[String],
    selector: &dyn SourceSelector,
    options: ResolveOptions,
) -> Result<BatchReport> {
    let mut report = BatchReport::new();
    for name in names {
        let outcome = install_one(ctx, name, selector, options)?;
        report.push(name, outcome);
    }
    Ok(report)
}

fn install_one(
    ctx: &AppContext,
    name: &str,
    selector: &dyn SourceSelector,
    options: ResolveOptions,
) -> Result<Outcome> {
    if let Err(e) = validate_package_name(name) {
        return Ok(Outcome::Failed(e.to_string()));
    }

    if let Some(existing) = ctx.store.get(name)? {
        let moving = options.from.is_some_and(|from| from != existing.source);
        if !options.force && !moving {
            return Ok(Outcome::Skipped(format!(
                "already installed from {} ({}); use --force to reinstall",
                existing.source.label(),
                existing.version
            )));
        }
    }

    output::info(&format!("Searching for '{}'", name));
    let search = search_all(&ctx.managers, name);
    let mut matches = filter_exact_matches(&search);
    if let Some(from) = options.from {
        matches.retain(|m| m.source == from);
    }

    let chosen = match matches.len() {
        0 => {
            let mut reason = match options.from {
                Some(from) => format!("no exact match in {}", from.label()),
                None => "no exact match in any source".to_string(),
            };
            if !search.failures.is_empty() {
                let failed: Vec<&str> = search.failures.iter().map(|f| f.source.label()).collect();
                reason.push_str(&format!(" ({} unavailable)", failed.join(", ")));
            }
            return Ok(Outcome::Skipped(reason));
        }
        1 => &matches[0],
        n => match selector.select(name, &matches) {
            Some(index) if index < n => &matches[index],
            selection => {
                let err = AllpacError::AmbiguousSelection(match selection {
                    Some(index) => format!("choice {} is out of range 1..={}", index + 1, n),
                    None => format!("{} sources match and none was chosen", n),
                });
                warn!(package = name, error = %err, "skipping");
                return Ok(Outcome::Skipped(err.to_string()));
            }
        },
    };

    let source = chosen.source;
    let manager = match ctx.managers.get(source) {
        Ok(manager) => manager,
        Err(e) => return Ok(Outcome::Failed(e.to_string())),
    };

    info!(package = name, source = %source, "installing");
    match manager.install(name) {
        Ok(version) => {
            ctx.store.upsert(name, source, version.as_str())?;
            Ok(Outcome::Installed { source, version })
        }
        Err(AllpacError::Interrupted) => Err(AllpacError::Interrupted),
        Err(e) => {
            warn!(package = name, source = %source, error = %e, "install failed");
            Ok(Outcome::Failed(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests;
