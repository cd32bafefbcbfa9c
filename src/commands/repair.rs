//! Repair command
//!
//! Brings an unreadable package list back: the newest backup that still
//! parses wins, otherwise the list starts over empty.

use crate::error::Result;
use crate::state::RecordStore;
use crate::ui as output;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The list was readable; nothing changed
    Healthy { packages: usize },
    Restored { packages: usize },
    Reinitialized,
}

pub fn run(store: &RecordStore) -> Result<()> {
    match repair(store)? {
        RepairOutcome::Healthy { packages } => output::success(&format!(
            "Package list is healthy ({} tracked package(s))",
            packages
        )),
        RepairOutcome::Restored { packages } => output::success(&format!(
            "Restored package list from backup ({} tracked package(s))",
            packages
        )),
        RepairOutcome::Reinitialized => {
            output::warning("No usable backup found; package list reset to empty");
            output::info("Run 'allpac install <package>' to track previously installed packages again");
        }
    }
    Ok(())
}

pub fn repair(store: &RecordStore) -> Result<RepairOutcome> {
    match store.load() {
        Ok(list) => return Ok(RepairOutcome::Healthy { packages: list.len() }),
        Err(e) => warn!(error = %e, "package list unreadable, repairing"),
    }

    if let Some(list) = store.restore_from_backup()? {
        return Ok(RepairOutcome::Restored {
            packages: list.len(),
        });
    }

    store.reinitialize()?;
    Ok(RepairOutcome::Reinitialized)
}
