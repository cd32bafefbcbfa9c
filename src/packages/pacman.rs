use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::packages::command::{CommandRunner, attribute, failure_reason};
use crate::packages::parse::{field_value, search_line};
use crate::packages::traits::PackageManager;
use std::process::Command;
use std::sync::{Mutex, MutexGuard, PoisonError};

static TRANSACTION: Mutex<()> = Mutex::new(());

/// pacman holds `db.lck` for the length of a transaction and refuses a
/// second one. Every privileged pacman call in this process (native and
/// AUR) runs while holding this guard.
pub(crate) fn transaction() -> MutexGuard<'static, ()> {
    TRANSACTION.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct PacmanManager {
    runner: CommandRunner,
    query: CommandRunner,
}

impl PacmanManager {
    /// `runner` drives installs and upgrades, `query` drives searches and
    /// version lookups
    pub fn new(runner: CommandRunner, query: CommandRunner) -> Self {
        Self { runner, query }
    }

    fn installed_version(&self, package: &str) -> Result<String> {
        let output = self
            .query
            .output(Command::new("pacman").args(["-Q", package]))
            .map_err(|e| attribute(Source::Pacman, e))?;

        if !output.status.success() {
            return Err(AllpacError::backend(
                Source::Pacman,
                format!(
                    "'{}' is not installed after install: {}",
                    package,
                    failure_reason(&output)
                ),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_query_version(&stdout, package).ok_or_else(|| {
            AllpacError::backend(
                Source::Pacman,
                format!("could not read installed version of '{}'", package),
            )
        })
    }

    fn sudo_pacman(&self, args: &[&str], packages: &[String], action: &str) -> Result<()> {
        let _transaction = transaction();
        let status = self
            .runner
            .interactive(Command::new("sudo").arg("pacman").args(args).args(packages))
            .map_err(|e| attribute(Source::Pacman, e))?;

        if !status.success() {
            return Err(AllpacError::backend(
                Source::Pacman,
                format!("{} of {} failed ({})", action, packages.join(" "), status),
            ));
        }
        Ok(())
    }
}

impl PackageManager for PacmanManager {
    fn source(&self) -> Source {
        Source::Pacman
    }

    fn is_available(&self) -> bool {
        which::which("pacman").is_ok()
    }

    fn search(&self, query: &str) -> Result<Vec<String>> {
        let output = self
            .query
            .output(Command::new("pacman").args(["-Ss", query]))
            .map_err(|e| attribute(Source::Pacman, e))?;

        // No hits: exit 1 with nothing printed
        if !output.status.success() {
            if output.stdout.is_empty() && output.stderr.is_empty() {
                return Ok(Vec::new());
            }
            return Err(AllpacError::backend(Source::Pacman, failure_reason(&output)));
        }

        Ok(parse_search(&String::from_utf8_lossy(&output.stdout)))
    }

    fn latest_version(&self, package: &str) -> Result<String> {
        let output = self
            .query
            .output(Command::new("pacman").args(["-Si", package]))
            .map_err(|e| attribute(Source::Pacman, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("was not found") {
                return Err(AllpacError::NotFound(format!(
                    "'{}' is not in the pacman repositories",
                    package
                )));
            }
            return Err(AllpacError::backend(Source::Pacman, failure_reason(&output)));
        }

        field_value(&String::from_utf8_lossy(&output.stdout), "Version")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AllpacError::backend(
                    Source::Pacman,
                    format!("no Version field in pacman -Si output for '{}'", package),
                )
            })
    }

    fn install(&self, package: &str) -> Result<String> {
        self.sudo_pacman(&["-S", "--noconfirm"], &[package.to_string()], "install")?;
        self.installed_version(package)
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        self.sudo_pacman(&["-Rns", "--noconfirm"], &[package.to_string()], "removal")
    }

    fn upgrade(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        self.sudo_pacman(&["-S", "--noconfirm"], packages, "upgrade")
    }
}

/// `pacman -Ss` prints a header per hit followed by an indented description:
///
/// ```text
/// extra/htop 3.3.0-1 [installed]
///     Interactive process viewer
/// ```
fn parse_search(stdout: &str) -> Vec<String> {
    let mut results = Vec::new();
    let mut lines = stdout.lines().peekable();

    while let Some(line) = lines.next() {
        if line.trim().is_empty() || line.starts_with(char::is_whitespace) {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(qualified) = parts.next() else {
            continue;
        };
        let name = qualified.rsplit('/').next().unwrap_or(qualified);
        let version = parts.next().unwrap_or_default();

        let description = match lines.peek() {
            Some(next) if next.starts_with(char::is_whitespace) => {
                lines.next().unwrap_or_default().trim()
            }
            _ => "",
        };

        let mut entry = search_line(name, version, description);
        if line.contains("[installed") {
            entry.push_str(" (Installed)");
        }
        results.push(entry);
    }

    results
}

/// `pacman -Q name` prints `name version`
fn parse_query_version(stdout: &str, package: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        (parts.next()? == package)
            .then(|| parts.next().map(str::to_string))
            .flatten()
    })
}
