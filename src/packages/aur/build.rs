use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::packages::command::{CommandRunner, attribute, failure_reason};
use crate::packages::pacman::transaction;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

static BUILD_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh `cache/<name>/<timestamp>` directory for one build. Concurrent
/// builds of the same package never share a working tree.
pub fn build_dir(cache_dir: &Path, package: &str) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%d%H%M%S%f");
    let seq = BUILD_COUNTER.fetch_add(1, Ordering::Relaxed);
    cache_dir.join(package).join(format!("{}-{}", stamp, seq))
}

/// Programs an AUR build shells out to
#[derive(Debug, Clone)]
pub struct BuildTools {
    pub git: String,
    pub makepkg: String,
    pub sudo: String,
}

impl Default for BuildTools {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            makepkg: "makepkg".to_string(),
            sudo: "sudo".to_string(),
        }
    }
}

/// Clone the package repository, build it and install the result.
/// Returns the version the PKGBUILD declares after the build.
///
/// Cloning and compiling run freely in parallel with other builds. The two
/// steps that touch the pacman database (installing make/run dependencies
/// and `pacman -U` of the built files) run under
/// [`transaction`](crate::packages::pacman::transaction).
pub fn clone_and_build(
    runner: &CommandRunner,
    tools: &BuildTools,
    aur_url: &str,
    package: &str,
    dir: &Path,
) -> Result<String> {
    if let Some(parent) = dir.parent() {
        fs::create_dir_all(parent).map_err(|e| AllpacError::IoError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let repo = format!("{}/{}.git", aur_url.trim_end_matches('/'), package);
    info!(package, %repo, dir = %dir.display(), "cloning AUR package");
    let output = runner
        .output(
            Command::new(&tools.git)
                .args(["clone", "--depth", "1", repo.as_str()])
                .arg(dir),
        )
        .map_err(|e| attribute(Source::Aur, e))?;
    if !output.status.success() {
        return Err(AllpacError::backend(
            Source::Aur,
            format!("git clone of {} failed: {}", package, failure_reason(&output)),
        ));
    }

    // Cloning an unknown name succeeds with an empty repository
    let pkgbuild = dir.join("PKGBUILD");
    if !pkgbuild.exists() {
        return Err(AllpacError::NotFound(format!(
            "'{}' has no PKGBUILD in the AUR",
            package
        )));
    }

    {
        let _transaction = transaction();
        debug!(package, "installing build dependencies");
        makepkg(runner, tools, dir, package, &["--syncdeps", "--nobuild", "--noconfirm"])?;
    }

    debug!(package, "building");
    makepkg(runner, tools, dir, package, &["--noextract", "--noconfirm"])?;

    let files = built_packages(runner, tools, dir, package)?;
    {
        let _transaction = transaction();
        info!(package, files = files.len(), "installing built package");
        let status = runner
            .interactive(
                Command::new(&tools.sudo)
                    .args(["pacman", "-U", "--noconfirm"])
                    .args(&files),
            )
            .map_err(|e| attribute(Source::Aur, e))?;
        if !status.success() {
            return Err(AllpacError::backend(
                Source::Aur,
                format!("pacman -U for {} failed ({})", package, status),
            ));
        }
    }

    // makepkg rewrites pkgver in place for VCS packages, so read it after
    let content = fs::read_to_string(&pkgbuild).map_err(|e| AllpacError::IoError {
        path: pkgbuild.clone(),
        source: e,
    })?;
    pkgbuild_version(&content).ok_or_else(|| {
        AllpacError::backend(
            Source::Aur,
            format!("PKGBUILD of {} declares no pkgver", package),
        )
    })
}

fn makepkg(
    runner: &CommandRunner,
    tools: &BuildTools,
    dir: &Path,
    package: &str,
    args: &[&str],
) -> Result<()> {
    let status = runner
        .interactive(Command::new(&tools.makepkg).args(args).current_dir(dir))
        .map_err(|e| attribute(Source::Aur, e))?;
    if !status.success() {
        return Err(AllpacError::backend(
            Source::Aur,
            format!("makepkg {} for {} failed ({})", args.join(" "), package, status),
        ));
    }
    Ok(())
}

/// Package files the build produced. `--packagelist` also names optional
/// outputs (debug packages) that may not exist, so only existing files count.
fn built_packages(
    runner: &CommandRunner,
    tools: &BuildTools,
    dir: &Path,
    package: &str,
) -> Result<Vec<PathBuf>> {
    let output = runner
        .output(
            Command::new(&tools.makepkg)
                .arg("--packagelist")
                .current_dir(dir),
        )
        .map_err(|e| attribute(Source::Aur, e))?;
    if !output.status.success() {
        return Err(AllpacError::backend(
            Source::Aur,
            format!(
                "makepkg --packagelist for {} failed: {}",
                package,
                failure_reason(&output)
            ),
        ));
    }

    let files: Vec<PathBuf> = String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| dir.join(line))
        .filter(|path| path.is_file())
        .collect();
    if files.is_empty() {
        return Err(AllpacError::backend(
            Source::Aur,
            format!("makepkg produced no package file for {}", package),
        ));
    }
    Ok(files)
}

/// `[epoch:]pkgver-pkgrel`, the format the RPC reports as `Version`
pub fn pkgbuild_version(content: &str) -> Option<String> {
    let pkgver = assignment(content, "pkgver")?;
    let mut version = match assignment(content, "epoch") {
        Some(epoch) if epoch != "0" => format!("{}:{}", epoch, pkgver),
        _ => pkgver,
    };
    if let Some(pkgrel) = assignment(content, "pkgrel") {
        version.push('-');
        version.push_str(&pkgrel);
    }
    Some(version)
}

fn assignment(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let value = line.trim().strip_prefix(key)?.strip_prefix('=')?;
        let value = value
            .split('#')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '"' || c == '\'');
        (!value.is_empty()).then(|| value.to_string())
    })
}
