use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// Binary with an isolated home so nothing touches the real ~/.allpac.
fn allpac(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_allpac"));
    cmd.env("ALLPAC_HOME", home).env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_command() {
    let home = TempDir::new().expect("tempdir");
    allpac(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("pacman, snap, flatpak and the AUR"))
        .stdout(predicate::str::contains("clean-aur"));
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().expect("tempdir");
    let expected = format!("allpac {}", env!("CARGO_PKG_VERSION"));
    allpac(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_unknown_subcommand_fails() {
    let home = TempDir::new().expect("tempdir");
    allpac(home.path())
        .arg("unknown-command-xyz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: allpac"));
}

#[test]
fn test_list_on_fresh_home_initializes_package_list() {
    let home = TempDir::new().expect("tempdir");
    allpac(home.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages installed through allpac"));

    let content = fs::read_to_string(home.path().join("pkg.list")).expect("pkg.list created");
    assert_eq!(content.trim(), "{}");
}

#[test]
fn test_list_shows_tracked_packages_by_source() {
    let home = TempDir::new().expect("tempdir");
    fs::write(
        home.path().join("pkg.list"),
        r#"{"htop":{"source":"pacman","version":"3.3.0-1"},"yay":{"source":"aur","version":"12.3.5-1"}}"#,
    )
    .expect("seed");

    allpac(home.path())
        .args(["list", "--from", "aur"])
        .assert()
        .success()
        .stdout(predicate::str::contains("yay"))
        .stdout(predicate::str::contains("12.3.5-1"))
        .stdout(predicate::str::contains("htop").not());
}

#[test]
fn test_rebuild_of_untracked_package_fails() {
    let home = TempDir::new().expect("tempdir");
    allpac(home.path())
        .args(["rebuild", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not tracked"));
}

#[test]
fn test_rebuild_rejects_non_aur_package() {
    let home = TempDir::new().expect("tempdir");
    fs::write(
        home.path().join("pkg.list"),
        r#"{"htop":{"source":"pacman","version":"3.3.0-1"}}"#,
    )
    .expect("seed");

    allpac(home.path())
        .args(["rebuild", "htop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("only AUR packages can be rebuilt"));
}

#[test]
fn test_uninstall_of_untracked_package_fails() {
    let home = TempDir::new().expect("tempdir");
    allpac(home.path())
        .args(["uninstall", "ghost"])
        .assert()
        .failure();

    let content = fs::read_to_string(home.path().join("pkg.list")).expect("pkg.list");
    assert_eq!(content.trim(), "{}");
}

#[test]
fn test_invalid_config_key_is_rejected() {
    let home = TempDir::new().expect("tempdir");
    fs::write(home.path().join("config.kdl"), "settings {\n    no-such-setting 1\n}\n").expect("config");

    allpac(home.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-setting"));
}

#[test]
fn test_zero_timeout_is_rejected() {
    let home = TempDir::new().expect("tempdir");
    allpac(home.path())
        .args(["--timeout", "0", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--timeout"));
}

#[test]
fn test_clean_aur_recreates_empty_cache() {
    let home = TempDir::new().expect("tempdir");
    let leftover = home.path().join("cache").join("yay").join("build-1");
    fs::create_dir_all(&leftover).expect("seed cache");

    allpac(home.path()).arg("clean-aur").assert().success();

    let cache = home.path().join("cache");
    assert!(cache.is_dir());
    assert_eq!(fs::read_dir(&cache).expect("read cache").count(), 0);
}

#[test]
fn test_repair_restores_newest_valid_backup() {
    let home = TempDir::new().expect("tempdir");
    let list = home.path().join("pkg.list");
    fs::write(&list, "{corrupted json data {{{").expect("corrupt");
    fs::write(
        home.path().join("pkg.list.bak.1"),
        r#"{"htop":{"source":"pacman","version":"3.3.0-1"}}"#,
    )
    .expect("backup");

    allpac(home.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("repair"));

    allpac(home.path())
        .arg("repair")
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored"));

    let restored = fs::read_to_string(&list).expect("read restored");
    assert!(restored.contains("htop"));
}

#[test]
fn test_repair_without_backup_resets_and_suggests_plain_install() {
    let home = TempDir::new().expect("tempdir");
    let list = home.path().join("pkg.list");
    fs::write(&list, "not json").expect("corrupt");

    allpac(home.path())
        .arg("repair")
        .assert()
        .success()
        .stdout(predicate::str::contains("allpac install <package>"))
        .stdout(predicate::str::contains("--force").not());

    assert_eq!(fs::read_to_string(&list).expect("read").trim(), "{}");
}

#[test]
fn test_bash_completions_are_generated() {
    let home = TempDir::new().expect("tempdir");
    allpac(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("allpac"))
        .stdout(predicate::str::contains("install"));
}
