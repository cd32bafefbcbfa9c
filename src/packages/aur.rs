mod build;
mod rpc;

use build::BuildTools;
pub use rpc::AurRpc;

use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::packages::command::{CommandRunner, attribute};
use crate::packages::pacman::transaction;
use crate::packages::parse::search_line;
use crate::packages::traits::{PackageManager, UpdateStrategy};
use crate::utils::sanitize::validate_path_component;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

/// AUR packages are looked up over the RPC interface and built from
/// source with `git` and `makepkg`; removal goes through pacman.
pub struct AurManager {
    rpc: AurRpc,
    aur_url: String,
    cache_dir: PathBuf,
    runner: CommandRunner,
    tools: BuildTools,
}

impl AurManager {
    pub fn new(rpc: AurRpc, aur_url: impl Into<String>, cache_dir: PathBuf, runner: CommandRunner) -> Self {
        Self {
            rpc,
            aur_url: aur_url.into(),
            cache_dir,
            runner,
            tools: BuildTools::default(),
        }
    }

    #[cfg(test)]
    fn with_tools(mut self, tools: BuildTools) -> Self {
        self.tools = tools;
        self
    }
}

impl PackageManager for AurManager {
    fn source(&self) -> Source {
        Source::Aur
    }

    fn is_available(&self) -> bool {
        which::which("git").is_ok() && which::which("makepkg").is_ok()
    }

    fn search(&self, query: &str) -> Result<Vec<String>> {
        Ok(self
            .rpc
            .search(query)?
            .into_iter()
            .map(|pkg| {
                search_line(
                    &pkg.name,
                    &pkg.version,
                    pkg.description.as_deref().unwrap_or_default(),
                )
            })
            .collect())
    }

    fn latest_version(&self, package: &str) -> Result<String> {
        self.rpc
            .info(package)?
            .map(|pkg| pkg.version)
            .ok_or_else(|| AllpacError::NotFound(format!("'{}' is not in the AUR", package)))
    }

    fn install(&self, package: &str) -> Result<String> {
        validate_path_component(package)?;
        let dir = build::build_dir(&self.cache_dir, package);
        build::clone_and_build(&self.runner, &self.tools, &self.aur_url, package, &dir)
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        let _transaction = transaction();
        let status = self
            .runner
            .interactive(Command::new(&self.tools.sudo).args(["pacman", "-Rns", "--noconfirm", package]))
            .map_err(|e| attribute(Source::Aur, e))?;

        if !status.success() {
            return Err(AllpacError::backend(
                Source::Aur,
                format!("removal of {} failed ({})", package, status),
            ));
        }
        Ok(())
    }

    /// Each package is rebuilt on its own; failures are collected so one
    /// broken build does not stop the rest.
    fn upgrade(&self, packages: &[String]) -> Result<()> {
        let mut failures = Vec::new();
        for package in packages {
            if let Err(e) = self.install(package) {
                warn!(package = %package, error = %e, "AUR rebuild failed");
                failures.push(format!("{}: {}", package, e));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AllpacError::backend(Source::Aur, failures.join("; ")))
        }
    }

    fn update_strategy(&self) -> UpdateStrategy {
        UpdateStrategy::PerPackage
    }

    fn clean_cache(&self, package: &str) -> Result<()> {
        validate_path_component(package)?;
        let dir = self.cache_dir.join(package);
        debug!(dir = %dir.display(), "discarding cached builds");
        match fs::remove_dir_all(&dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AllpacError::IoError { path: dir, source: e }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::tempdir;

    fn manager(base_url: &str, cache_dir: PathBuf) -> AurManager {
        let rpc = AurRpc::new(base_url, Duration::from_secs(5)).expect("client");
        AurManager::new(rpc, base_url, cache_dir, CommandRunner::new(Duration::from_secs(5)))
    }

    #[test]
    fn latest_version_of_unknown_package_is_not_found() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/rpc/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"type":"multiinfo","results":[]}"#)
            .create();

        let cache = tempdir().expect("tempdir");
        let err = manager(&server.url(), cache.path().to_path_buf())
            .latest_version("ghost")
            .expect_err("unknown package");
        assert!(err.is_not_found());
    }

    #[test]
    fn search_lines_start_with_package_name() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/rpc/")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"type":"search","results":[
                    {"Name":"yay","Version":"12.3.5-1","Description":"AUR helper"},
                    {"Name":"yay-bin","Version":"12.3.5-1","Description":null}
                ]}"#,
            )
            .create();

        let cache = tempdir().expect("tempdir");
        let lines = manager(&server.url(), cache.path().to_path_buf())
            .search("yay")
            .expect("search");
        assert_eq!(lines, vec!["yay 12.3.5-1 - AUR helper", "yay-bin 12.3.5-1"]);
    }

    #[test]
    fn clean_cache_removes_only_that_package() {
        let cache = tempdir().expect("tempdir");
        fs::create_dir_all(cache.path().join("yay/20240101")).expect("mkdir");
        fs::create_dir_all(cache.path().join("paru/20240101")).expect("mkdir");

        let aur = manager("http://127.0.0.1:9", cache.path().to_path_buf());
        aur.clean_cache("yay").expect("clean");
        aur.clean_cache("never-built").expect("absent is fine");

        assert!(!cache.path().join("yay").exists());
        assert!(cache.path().join("paru/20240101").exists());
    }

    /// Stand-ins for git, makepkg and sudo. Privileged steps log to `log`
    /// and note when they find another privileged step still running.
    fn fake_tools(bin: &Path, log: &Path) -> BuildTools {
        let critical = format!(
            "critical() {{\n\
             \x20 mkdir \"{marker}\" 2>/dev/null || echo overlap >> \"{log}\"\n\
             \x20 echo \"$1\" >> \"{log}\"\n\
             \x20 sleep 0.2\n\
             \x20 rmdir \"{marker}\" 2>/dev/null\n\
             }}\n",
            marker = bin.join("busy").display(),
            log = log.display(),
        );
        let git = "#!/bin/sh\nfor last; do :; done\nmkdir -p \"$last\"\n\
                   printf 'pkgname=demo\\npkgver=1.0\\npkgrel=1\\n' > \"$last/PKGBUILD\"\n"
            .to_string();
        let makepkg = format!(
            "#!/bin/sh\n{critical}case \"$1\" in\n\
             \x20 --syncdeps) critical deps ;;\n\
             \x20 --noextract) touch demo-1.0-1-any.pkg.tar.zst ;;\n\
             \x20 --packagelist) echo \"$(pwd)/demo-1.0-1-any.pkg.tar.zst\"; echo \"$(pwd)/demo-debug-1.0-1-any.pkg.tar.zst\" ;;\n\
             esac\n"
        );
        let sudo = format!("#!/bin/sh\n{critical}critical \"$*\"\n");

        let write = |name: &str, body: &str| {
            let path = bin.join(name);
            fs::write(&path, body).expect("write tool");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
            path.display().to_string()
        };
        BuildTools {
            git: write("git", &git),
            makepkg: write("makepkg", &makepkg),
            sudo: write("sudo", &sudo),
        }
    }

    #[test]
    fn concurrent_installs_never_overlap_pacman_transactions() {
        let cache = tempdir().expect("tempdir");
        let bin = tempdir().expect("tempdir");
        let log = bin.path().join("privileged.log");
        let aur = manager("http://127.0.0.1:9", cache.path().to_path_buf())
            .with_tools(fake_tools(bin.path(), &log));

        let (alpha, beta) = std::thread::scope(|s| {
            let alpha = s.spawn(|| aur.install("alpha"));
            let beta = s.spawn(|| aur.install("beta"));
            (
                alpha.join().expect("alpha thread"),
                beta.join().expect("beta thread"),
            )
        });
        assert_eq!(alpha.expect("alpha installs"), "1.0-1");
        assert_eq!(beta.expect("beta installs"), "1.0-1");

        let entries = fs::read_to_string(&log).expect("log");
        assert!(!entries.contains("overlap"), "{}", entries);
        assert_eq!(entries.lines().filter(|l| *l == "deps").count(), 2);
        let installs: Vec<&str> = entries
            .lines()
            .filter(|l| l.starts_with("pacman -U"))
            .collect();
        assert_eq!(installs.len(), 2);
        // The debug package was listed but never built
        assert!(installs.iter().all(|l| !l.contains("debug")));
    }

    #[test]
    fn path_like_names_are_rejected_before_any_work() {
        let cache = tempdir().expect("tempdir");
        let aur = manager("http://127.0.0.1:9", cache.path().to_path_buf());
        assert!(aur.install("../etc").is_err());
        assert!(aur.clean_cache("a/b").is_err());
    }
}
