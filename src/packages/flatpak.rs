use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::packages::command::{CommandRunner, attribute, failure_reason};
use crate::packages::parse::{field_value, search_line};
use crate::packages::traits::PackageManager;
use std::process::Command;

pub struct FlatpakManager {
    remote: String,
    runner: CommandRunner,
    query: CommandRunner,
}

impl FlatpakManager {
    pub fn new(remote: impl Into<String>, runner: CommandRunner, query: CommandRunner) -> Self {
        Self {
            remote: remote.into(),
            runner,
            query,
        }
    }

    fn flatpak(&self, args: &[&str], packages: &[String], action: &str) -> Result<()> {
        let status = self
            .runner
            .interactive(Command::new("flatpak").args(args).args(packages))
            .map_err(|e| attribute(Source::Flatpak, e))?;

        if !status.success() {
            return Err(AllpacError::backend(
                Source::Flatpak,
                format!("{} of {} failed ({})", action, packages.join(" "), status),
            ));
        }
        Ok(())
    }

    fn installed_version(&self, package: &str) -> Result<String> {
        let output = self
            .query
            .output(Command::new("flatpak").args(["info", package]))
            .map_err(|e| attribute(Source::Flatpak, e))?;

        if !output.status.success() {
            return Err(AllpacError::backend(
                Source::Flatpak,
                format!("'{}' is not installed after install: {}", package, failure_reason(&output)),
            ));
        }

        version_of(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            AllpacError::backend(
                Source::Flatpak,
                format!("could not read installed version of '{}'", package),
            )
        })
    }
}

impl PackageManager for FlatpakManager {
    fn source(&self) -> Source {
        Source::Flatpak
    }

    fn is_available(&self) -> bool {
        which::which("flatpak").is_ok()
    }

    fn search(&self, query: &str) -> Result<Vec<String>> {
        let output = self
            .query
            .output(Command::new("flatpak").args([
                "search",
                "--columns=application,version,description",
                query,
            ]))
            .map_err(|e| attribute(Source::Flatpak, e))?;

        if !output.status.success() {
            return Err(AllpacError::backend(Source::Flatpak, failure_reason(&output)));
        }

        Ok(parse_search(&String::from_utf8_lossy(&output.stdout)))
    }

    fn latest_version(&self, package: &str) -> Result<String> {
        let output = self
            .query
            .output(Command::new("flatpak").args(["remote-info", self.remote.as_str(), package]))
            .map_err(|e| attribute(Source::Flatpak, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("Nothing matches") || stderr.contains("not found") {
                return Err(AllpacError::NotFound(format!(
                    "'{}' is not on remote '{}'",
                    package, self.remote
                )));
            }
            return Err(AllpacError::backend(Source::Flatpak, failure_reason(&output)));
        }

        version_of(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            AllpacError::backend(
                Source::Flatpak,
                format!("no version reported for '{}'", package),
            )
        })
    }

    fn install(&self, package: &str) -> Result<String> {
        self.flatpak(
            &["install", "-y", self.remote.as_str()],
            &[package.to_string()],
            "install",
        )?;
        self.installed_version(package)
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        self.flatpak(&["uninstall", "-y"], &[package.to_string()], "removal")
    }

    fn upgrade(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        self.flatpak(&["update", "-y"], packages, "update")
    }
}

/// Tab separated `application version description`; "No matches found"
/// is printed for an empty result.
fn parse_search(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "No matches found")
        .map(|line| {
            let mut cols = line.split('\t');
            let app = cols.next().unwrap_or_default();
            let version = cols.next().unwrap_or_default();
            let description = cols.next().unwrap_or_default();
            search_line(app, version, description)
        })
        .collect()
}

/// Many apps publish no `Version:`; the commit is the only stable identity then
fn version_of(info: &str) -> Option<String> {
    field_value(info, "Version")
        .filter(|v| !v.is_empty())
        .or_else(|| field_value(info, "Commit").filter(|v| !v.is_empty()))
}
