//! Update command
//!
//! Reconciles tracked packages with what their backends currently offer:
//! a package is stale when the backend's latest version differs from the
//! recorded one. Stale packages are upgraded (one batch per backend, or one
//! build per package for the AUR) and their records refreshed in a single
//! store update at the end.

use crate::commands::report::{BatchReport, Outcome};
use crate::core::types::{Source, UpdateScope};
use crate::error::{AllpacError, Result};
use crate::packages::{PackageManager, UpdateStrategy};
use crate::state::{PackageList, PackageRecord};
use crate::traits::AppContext;
use crate::ui as output;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

pub struct UpdateOptions {
    pub scope: UpdateScope,
}

pub fn run(ctx: &AppContext, options: UpdateOptions) -> Result<()> {
    output::header(&format!("Checking {} for updates", options.scope));
    let mut report = reconcile(ctx, &options.scope)?;

    if report.items.is_empty() {
        output::info("No tracked packages in scope");
        return Ok(());
    }

    report.sort();
    report.render();
    // Finished upgrades are already recorded
    if output::is_interrupted() {
        return Err(AllpacError::Interrupted);
    }
    let updated = report
        .items
        .iter()
        .filter(|i| matches!(i.outcome, Outcome::Updated { .. }))
        .count();
    if updated == 0 && !report.has_failures() {
        output::success("Everything is up to date");
    }
    report.into_result()
}

/// A tracked package whose backend reports a different version
#[derive(Debug, Clone)]
struct Stale {
    name: String,
    recorded: String,
    latest: String,
}

struct SourceCheck {
    source: Source,
    stale: Vec<Stale>,
    report: BatchReport,
}

struct SourceUpgrade {
    records: Vec<(String, PackageRecord)>,
    report: BatchReport,
}

/// Detect stale packages in `scope`, upgrade them and refresh their records.
///
/// Per-package problems end up in the report; only store failures and an
/// untracked `UpdateScope::Package` are errors.
pub fn reconcile(ctx: &AppContext, scope: &UpdateScope) -> Result<BatchReport> {
    let list = ctx.store.load()?;
    let candidates = candidates(&list, scope)?;
    info!(scope = %scope, sources = candidates.len(), "reconciling");

    let checks: Vec<SourceCheck> = candidates
        .par_iter()
        .map(|(source, packages)| check_source(ctx, *source, packages))
        .collect();

    let mut report = BatchReport::new();
    let mut to_upgrade = Vec::new();
    for check in checks {
        report.items.extend(check.report.items);
        if !check.stale.is_empty() {
            to_upgrade.push((check.source, check.stale));
        }
    }

    if to_upgrade.is_empty() {
        debug!("nothing stale");
        return Ok(report);
    }

    let upgrades: Vec<SourceUpgrade> = to_upgrade
        .par_iter()
        .map(|(source, stale)| upgrade_source(ctx, *source, stale))
        .collect();

    let mut records = Vec::new();
    for upgrade in upgrades {
        report.items.extend(upgrade.report.items);
        records.extend(upgrade.records);
    }

    if !records.is_empty() {
        ctx.store.update(|list| {
            for (name, record) in records {
                list.insert(name, record);
            }
        })?;
    }

    Ok(report)
}

/// Tracked `(name, recorded version)` pairs per source for `scope`
fn candidates(
    list: &PackageList,
    scope: &UpdateScope,
) -> Result<BTreeMap<Source, Vec<(String, String)>>> {
    let mut grouped: BTreeMap<Source, Vec<(String, String)>> = BTreeMap::new();
    match scope {
        UpdateScope::All => {
            for (name, record) in list.iter() {
                grouped
                    .entry(record.source)
                    .or_default()
                    .push((name.clone(), record.version.clone()));
            }
        }
        UpdateScope::Source(source) => {
            for (name, record) in list.iter().filter(|(_, r)| r.source == *source) {
                grouped
                    .entry(*source)
                    .or_default()
                    .push((name.clone(), record.version.clone()));
            }
        }
        UpdateScope::Package(name) => {
            let record = list.get(name).ok_or_else(|| {
                AllpacError::NotFound(format!("'{}' is not tracked by allpac", name))
            })?;
            grouped.insert(record.source, vec![(name.clone(), record.version.clone())]);
        }
    }
    Ok(grouped)
}

fn check_source(ctx: &AppContext, source: Source, packages: &[(String, String)]) -> SourceCheck {
    let mut check = SourceCheck {
        source,
        stale: Vec::new(),
        report: BatchReport::new(),
    };

    let manager = match ctx.managers.get(source) {
        Ok(manager) => manager,
        Err(e) => {
            for (name, _) in packages {
                check.report.push(name, Outcome::Failed(e.to_string()));
            }
            return check;
        }
    };

    for (name, recorded) in packages {
        match manager.latest_version(name) {
            Ok(latest) if latest == *recorded => {
                check.report.push(name, Outcome::UpToDate { version: latest });
            }
            Ok(latest) => {
                debug!(package = %name, %recorded, %latest, "stale");
                check.stale.push(Stale {
                    name: name.clone(),
                    recorded: recorded.clone(),
                    latest,
                });
            }
            Err(e) => {
                warn!(package = %name, source = %source, error = %e, "version check failed");
                let reason = if e.is_not_found() {
                    format!("no longer offered by {} ({})", source.label(), e)
                } else {
                    format!("version check failed: {}", e)
                };
                check.report.push(name, Outcome::Failed(reason));
            }
        }
    }
    check
}

fn upgrade_source(ctx: &AppContext, source: Source, stale: &[Stale]) -> SourceUpgrade {
    let mut result = SourceUpgrade {
        records: Vec::new(),
        report: BatchReport::new(),
    };

    let manager = match ctx.managers.get(source) {
        Ok(manager) => manager,
        Err(e) => {
            for pkg in stale {
                result.report.push(&pkg.name, Outcome::Failed(e.to_string()));
            }
            return result;
        }
    };

    let outcomes: Vec<(&Stale, Result<String>)> = match manager.update_strategy() {
        UpdateStrategy::Batch => {
            let names: Vec<String> = stale.iter().map(|s| s.name.clone()).collect();
            info!(source = %source, count = names.len(), "batch upgrade");
            match manager.upgrade(&names) {
                Ok(()) => stale
                    .iter()
                    .map(|pkg| (pkg, Ok(refreshed_version(manager, pkg))))
                    .collect(),
                Err(e) => {
                    let reason = e.to_string();
                    stale
                        .iter()
                        .map(|pkg| (pkg, Err(AllpacError::backend(source, reason.clone()))))
                        .collect()
                }
            }
        }
        UpdateStrategy::PerPackage => upgrade_each(ctx, manager, stale),
    };

    for (pkg, outcome) in outcomes {
        match outcome {
            Ok(version) => {
                result.report.push(
                    &pkg.name,
                    Outcome::Updated {
                        source,
                        from: pkg.recorded.clone(),
                        to: version.clone(),
                    },
                );
                result
                    .records
                    .push((pkg.name.clone(), PackageRecord::new(source, version)));
            }
            Err(e) => {
                warn!(package = %pkg.name, source = %source, error = %e, "upgrade failed");
                result
                    .report
                    .push(&pkg.name, Outcome::Failed(format!("update failed: {}", e)));
            }
        }
    }
    result
}

/// One upgrade per package on a pool bounded by `build-jobs`; every task
/// is joined and keeps its own result.
fn upgrade_each<'a>(
    ctx: &AppContext,
    manager: &dyn PackageManager,
    stale: &'a [Stale],
) -> Vec<(&'a Stale, Result<String>)> {
    let run_one = |pkg: &'a Stale| {
        let outcome = manager
            .upgrade(std::slice::from_ref(&pkg.name))
            .map(|()| refreshed_version(manager, pkg));
        (pkg, outcome)
    };

    let jobs = ctx.settings.build_jobs.max(1);
    match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool.install(|| stale.par_iter().map(run_one).collect()),
        Err(e) => {
            warn!(error = %e, "could not start build pool, building sequentially");
            stale.iter().map(run_one).collect()
        }
    }
}

/// Version to record after a successful upgrade. The backend is asked
/// again; if that fails the version seen before upgrading is used.
fn refreshed_version(manager: &dyn PackageManager, pkg: &Stale) -> String {
    match manager.latest_version(&pkg.name) {
        Ok(version) => version,
        Err(e) => {
            warn!(package = %pkg.name, error = %e, "post-upgrade version query failed");
            pkg.latest.clone()
        }
    }
}
