use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::packages::command::{CommandRunner, attribute, failure_reason};
use crate::packages::parse::{field_value, search_line};
use crate::packages::traits::PackageManager;
use std::process::Command;

const DEFAULT_CHANNEL: &str = "latest/stable";

pub struct SnapManager {
    runner: CommandRunner,
    query: CommandRunner,
}

impl SnapManager {
    pub fn new(runner: CommandRunner, query: CommandRunner) -> Self {
        Self { runner, query }
    }

    fn info(&self, package: &str) -> Result<String> {
        let output = self
            .query
            .output(Command::new("snap").args(["info", package]))
            .map_err(|e| attribute(Source::Snap, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
            if stderr.contains("not found") || stderr.contains("no snap found") {
                return Err(AllpacError::NotFound(format!(
                    "'{}' is not in the snap store",
                    package
                )));
            }
            return Err(AllpacError::backend(Source::Snap, failure_reason(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn sudo_snap(&self, verb: &str, packages: &[String]) -> Result<()> {
        let status = self
            .runner
            .interactive(Command::new("sudo").args(["snap", verb]).args(packages))
            .map_err(|e| attribute(Source::Snap, e))?;

        if !status.success() {
            return Err(AllpacError::backend(
                Source::Snap,
                format!("snap {} {} failed ({})", verb, packages.join(" "), status),
            ));
        }
        Ok(())
    }
}

impl PackageManager for SnapManager {
    fn source(&self) -> Source {
        Source::Snap
    }

    fn is_available(&self) -> bool {
        which::which("snap").is_ok()
    }

    fn search(&self, query: &str) -> Result<Vec<String>> {
        let output = self
            .query
            .output(Command::new("snap").args(["find", query]))
            .map_err(|e| attribute(Source::Snap, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("No matching snaps") {
                return Ok(Vec::new());
            }
            return Err(AllpacError::backend(Source::Snap, failure_reason(&output)));
        }

        Ok(parse_find(&String::from_utf8_lossy(&output.stdout)))
    }

    fn latest_version(&self, package: &str) -> Result<String> {
        let info = self.info(package)?;
        channel_version(&info).ok_or_else(|| {
            AllpacError::backend(
                Source::Snap,
                format!("no version published for '{}'", package),
            )
        })
    }

    fn install(&self, package: &str) -> Result<String> {
        self.sudo_snap("install", &[package.to_string()])?;
        let info = self.info(package)?;
        installed_version(&info).ok_or_else(|| {
            AllpacError::backend(
                Source::Snap,
                format!("'{}' reports no installed version", package),
            )
        })
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        self.sudo_snap("remove", &[package.to_string()])
    }

    fn upgrade(&self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        self.sudo_snap("refresh", packages)
    }
}

/// `snap find` prints a column table: Name, Version, Publisher, Notes, Summary
fn parse_find(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("Name "))
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let version = parts.next().unwrap_or_default();
            let rest: Vec<&str> = parts.collect();
            Some(search_line(name, version, &rest.join(" ")))
        })
        .collect()
}

/// Version published on the channel the snap tracks (or `latest/stable`
/// when it is not installed), falling back to the installed version.
fn channel_version(info: &str) -> Option<String> {
    let channel = field_value(info, "tracking")
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CHANNEL.to_string());

    published_version(info, &channel).or_else(|| installed_version(info))
}

/// Walk the `channels:` block. `^` repeats the nearest channel above that
/// has a version; `--` marks a closed channel.
fn published_version(info: &str, channel: &str) -> Option<String> {
    let mut in_channels = false;
    let mut above: Option<&str> = None;
    for line in info.lines() {
        if !line.starts_with(char::is_whitespace) {
            in_channels = line.trim_end() == "channels:";
            continue;
        }
        if !in_channels {
            continue;
        }
        let Some((name, value)) = line.trim().split_once(':') else {
            continue;
        };
        let version = match value.split_whitespace().next() {
            Some("^") => above,
            Some("--") | None => None,
            Some(version) => Some(version),
        };
        if name == channel {
            return version.map(str::to_string);
        }
        if version.is_some() {
            above = version;
        }
    }
    None
}

/// `installed:   128.0.3   (4451) 270MB -`
fn installed_version(info: &str) -> Option<String> {
    field_value(info, "installed")?
        .split_whitespace()
        .next()
        .map(str::to_string)
}
