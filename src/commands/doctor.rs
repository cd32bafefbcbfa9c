//! Doctor command
//!
//! Reports which backend tools are installed and whether the package list
//! and config file are readable. Nothing is installed or changed.

use crate::config::Settings;
use crate::error::Result;
use crate::state::RecordStore;
use crate::ui as output;
use colored::Colorize;
use std::path::Path;

/// Tools each backend needs, in display order
const TOOLS: [(&str, &str); 6] = [
    ("pacman", "native packages"),
    ("sudo", "privileged installs"),
    ("snap", "snap packages"),
    ("flatpak", "flatpak packages"),
    ("git", "AUR clones"),
    ("makepkg", "AUR builds"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub tool: &'static str,
    pub purpose: &'static str,
    pub available: bool,
}

pub fn tool_report() -> Vec<ToolStatus> {
    TOOLS
        .iter()
        .map(|&(tool, purpose)| ToolStatus {
            tool,
            purpose,
            available: which::which(tool).is_ok(),
        })
        .collect()
}

pub fn run(store: &RecordStore, config_path: &Path) -> Result<()> {
    output::header("Backend tools");
    for status in tool_report() {
        let mark = if status.available {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        };
        output::indent(&format!("{} {:<8} {}", mark, status.tool, status.purpose.dimmed()), 1);
    }

    output::header("Files");
    match store.load() {
        Ok(list) => output::indent(
            &format!("{} {} ({} tracked)", "✓".green().bold(), store.path().display(), list.len()),
            1,
        ),
        Err(e) => {
            output::indent(&format!("{} {}", "✗".red().bold(), e), 1);
            output::indent("Run 'allpac repair' to recover it", 2);
        }
    }
    match Settings::load_from(config_path) {
        Ok(_) if config_path.exists() => output::indent(
            &format!("{} {}", "✓".green().bold(), config_path.display()),
            1,
        ),
        Ok(_) => output::indent(
            &format!("{} {} (not present, defaults in use)", "·".dimmed(), config_path.display()),
            1,
        ),
        Err(e) => output::indent(&format!("{} {}", "✗".red().bold(), e), 1),
    }

    Ok(())
}
