//! Per-package outcomes of a batch command.
//!
//! One failing package never aborts its siblings: every item gets an
//! [`Outcome`], the whole report is printed, and only then does the
//! command turn "something did not succeed" into an exit status.

use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::ui as output;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Installed { source: Source, version: String },
    Updated { source: Source, from: String, to: String },
    UpToDate { version: String },
    Uninstalled { source: Source },
    /// Deliberately not attempted (no match, no selection, already tracked)
    Skipped(String),
    Failed(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Skipped(_) | Self::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub package: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub items: Vec<ItemOutcome>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, package: impl Into<String>, outcome: Outcome) {
        self.items.push(ItemOutcome {
            package: package.into(),
            outcome,
        });
    }

    pub fn get(&self, package: &str) -> Option<&Outcome> {
        self.items
            .iter()
            .find(|item| item.package == package)
            .map(|item| &item.outcome)
    }

    pub fn unsuccessful(&self) -> usize {
        self.items
            .iter()
            .filter(|item| !item.outcome.is_success())
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.unsuccessful() > 0
    }

    pub fn sort(&mut self) {
        self.items.sort_by(|a, b| a.package.cmp(&b.package));
    }

    pub fn render(&self) {
        for item in &self.items {
            let name = &item.package;
            match &item.outcome {
                Outcome::Installed { source, version } => {
                    output::success(&format!("{} {} installed from {}", name, version, source.label()))
                }
                Outcome::Updated { source, from, to } => output::success(&format!(
                    "{} updated {} -> {} ({})",
                    name,
                    from,
                    to,
                    source.label()
                )),
                Outcome::UpToDate { version } => {
                    output::verbose(&format!("{} {} is up to date", name, version))
                }
                Outcome::Uninstalled { source } => {
                    output::success(&format!("{} removed ({})", name, source.label()))
                }
                Outcome::Skipped(reason) => output::warning(&format!("{}: {}", name, reason)),
                Outcome::Failed(reason) => output::error(&format!("{}: {}", name, reason)),
            }
        }
    }

    /// `Err(BatchFailed)` if any item was skipped or failed
    pub fn into_result(self) -> Result<()> {
        let failed = self.unsuccessful();
        if failed == 0 {
            Ok(())
        } else {
            Err(AllpacError::BatchFailed {
                failed,
                total: self.items.len(),
            })
        }
    }
}
