//! Uninstall command
//!
//! Removes tracked packages through the backend that installed them and
//! drops their records. Names allpac does not track are left alone.

use crate::commands::report::{BatchReport, Outcome};
use crate::error::{AllpacError, Result};
use crate::traits::AppContext;
use crate::ui as output;
use tracing::{info, warn};

pub struct UninstallOptions {
    pub packages: Vec<String>,
}

pub fn run(ctx: &AppContext, options: UninstallOptions) -> Result<()> {
    let report = uninstall(ctx, &options.packages)?;
    report.render();
    report.into_result()
}

pub fn uninstall(ctx: &AppContext, names: &[String]) -> Result<BatchReport> {
    let mut report = BatchReport::new();
    for name in names {
        let Some(record) = ctx.store.get(name)? else {
            report.push(name, Outcome::Skipped("not installed by allpac".to_string()));
            continue;
        };

        let manager = match ctx.managers.get(record.source) {
            Ok(manager) => manager,
            Err(e) => {
                report.push(name, Outcome::Failed(e.to_string()));
                continue;
            }
        };

        output::info(&format!("Removing {} ({})", name, record.source.label()));
        match manager.uninstall(name) {
            Ok(()) => {
                ctx.store.remove(name)?;
                info!(package = %name, source = %record.source, "uninstalled");
                report.push(
                    name,
                    Outcome::Uninstalled {
                        source: record.source,
                    },
                );
            }
            Err(AllpacError::Interrupted) => return Err(AllpacError::Interrupted),
            Err(e) => {
                warn!(package = %name, error = %e, "uninstall failed");
                report.push(name, Outcome::Failed(e.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::context;
    use crate::core::types::Source;
    use crate::packages::fake::FakeManager;
    use tempfile::tempdir;

    #[test]
    fn removes_through_owning_backend_and_drops_record() {
        let dir = tempdir().expect("tempdir");
        let pacman = FakeManager::new(Source::Pacman);
        let snap = FakeManager::new(Source::Snap);
        let ctx = context(dir.path(), &[&pacman, &snap]);
        ctx.store.upsert("firefox", Source::Snap, "128").expect("seed");

        let report = uninstall(&ctx, &["firefox".to_string()]).expect("uninstall");

        assert_eq!(
            report.get("firefox"),
            Some(&Outcome::Uninstalled {
                source: Source::Snap
            })
        );
        assert_eq!(snap.uninstall_calls(), vec!["firefox".to_string()]);
        assert!(pacman.uninstall_calls().is_empty());
        assert!(ctx.store.get("firefox").expect("get").is_none());
    }

    #[test]
    fn untracked_name_is_skipped_without_backend_call() {
        let dir = tempdir().expect("tempdir");
        let pacman = FakeManager::new(Source::Pacman);
        let ctx = context(dir.path(), &[&pacman]);

        let report = uninstall(&ctx, &["htop".to_string()]).expect("uninstall");

        assert!(matches!(report.get("htop"), Some(Outcome::Skipped(_))));
        assert!(pacman.uninstall_calls().is_empty());
    }

    #[test]
    fn failed_removal_keeps_record() {
        let dir = tempdir().expect("tempdir");
        let pacman = FakeManager::new(Source::Pacman).failing("htop");
        let ctx = context(dir.path(), &[&pacman]);
        ctx.store.upsert("htop", Source::Pacman, "1").expect("seed");
        ctx.store.upsert("vim", Source::Pacman, "1").expect("seed");

        let report =
            uninstall(&ctx, &["htop".to_string(), "vim".to_string()]).expect("uninstall");

        assert!(matches!(report.get("htop"), Some(Outcome::Failed(_))));
        assert!(ctx.store.get("htop").expect("get").is_some());
        assert!(ctx.store.get("vim").expect("get").is_none());
    }
}
