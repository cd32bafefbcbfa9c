use super::*;
use crate::commands::testing::context;
use crate::core::types::SourceResults;
use crate::packages::fake::FakeManager;
use crate::state::PackageRecord;
use std::fs;
use tempfile::tempdir;

fn never(_: &str, _: &[SourceResults]) -> Option<usize> {
    panic!("selector must not be consulted")
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn single_exact_match_is_installed_and_recorded() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman)
        .with_search(&["foo 1.2-1 - a tool", "foobar 3-1 - unrelated"])
        .with_latest("foo", "1.2-1");
    let snap = FakeManager::new(Source::Snap).with_search(&["foobar 1 - nope"]);
    let ctx = context(dir.path(), &[&pacman, &snap]);

    let report = resolve_and_install(&ctx, &names(&["foo"]), &never, ResolveOptions::default())
        .expect("resolve");

    assert_eq!(
        report.get("foo"),
        Some(&Outcome::Installed {
            source: Source::Pacman,
            version: "1.2-1".into()
        })
    );
    assert_eq!(pacman.install_calls(), vec!["foo".to_string()]);
    assert!(snap.install_calls().is_empty());
    assert_eq!(
        ctx.store.get("foo").expect("get"),
        Some(PackageRecord::new(Source::Pacman, "1.2-1"))
    );
}

#[test]
fn dev_suffix_counts_as_exact_match() {
    let dir = tempdir().expect("tempdir");
    let aur = FakeManager::new(Source::Aur).with_search(&["foo-dev 2-1 - dev headers"]);
    let ctx = context(dir.path(), &[&aur]);

    let report = resolve_and_install(&ctx, &names(&["foo"]), &never, ResolveOptions::default())
        .expect("resolve");

    assert!(matches!(report.get("foo"), Some(Outcome::Installed { source: Source::Aur, .. })));
}

#[test]
fn no_exact_match_is_skipped_and_batch_continues() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman).with_search(&[
        "foobar 1 - unrelated",
        "bar 1 - wanted",
    ]);
    let ctx = context(dir.path(), &[&pacman]);

    let report = resolve_and_install(
        &ctx,
        &names(&["foo", "bar"]),
        &never,
        ResolveOptions::default(),
    )
    .expect("resolve");

    assert!(matches!(report.get("foo"), Some(Outcome::Skipped(_))));
    assert!(matches!(report.get("bar"), Some(Outcome::Installed { .. })));
    assert_eq!(pacman.install_calls(), vec!["bar".to_string()]);
    assert!(ctx.store.get("foo").expect("get").is_none());
}

#[test]
fn ambiguous_match_uses_selector_choice() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman).with_search(&["foo 1 - native"]);
    let flatpak = FakeManager::new(Source::Flatpak).with_search(&["foo 2 - flat"]);
    let ctx = context(dir.path(), &[&pacman, &flatpak]);

    let pick_flatpak = |_: &str, candidates: &[SourceResults]| {
        candidates.iter().position(|c| c.source == Source::Flatpak)
    };
    let report = resolve_and_install(&ctx, &names(&["foo"]), &pick_flatpak, ResolveOptions::default())
        .expect("resolve");

    assert!(matches!(
        report.get("foo"),
        Some(Outcome::Installed { source: Source::Flatpak, .. })
    ));
    assert!(pacman.install_calls().is_empty());
    assert_eq!(
        ctx.store.get("foo").expect("get").map(|r| r.source),
        Some(Source::Flatpak)
    );
}

#[test]
fn out_of_range_selection_leaves_store_untouched() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman).with_search(&["foo 1 - native"]);
    let snap = FakeManager::new(Source::Snap).with_search(&["foo 2 - snap"]);
    let ctx = context(dir.path(), &[&pacman, &snap]);
    ctx.store.upsert("other", Source::Aur, "1").expect("seed");
    let before = fs::read(ctx.store.path()).expect("read");

    let out_of_range = |_: &str, _: &[SourceResults]| Some(7usize);
    let report = resolve_and_install(&ctx, &names(&["foo"]), &out_of_range, ResolveOptions::default())
        .expect("resolve");

    assert!(matches!(report.get("foo"), Some(Outcome::Skipped(_))));
    assert!(pacman.install_calls().is_empty());
    assert!(snap.install_calls().is_empty());
    assert_eq!(fs::read(ctx.store.path()).expect("read"), before);
}

#[test]
fn declined_selection_is_skipped() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman).with_search(&["foo 1"]);
    let snap = FakeManager::new(Source::Snap).with_search(&["foo 2"]);
    let ctx = context(dir.path(), &[&pacman, &snap]);

    let report = resolve_and_install(
        &ctx,
        &names(&["foo"]),
        &|_: &str, _: &[SourceResults]| None::<usize>,
        ResolveOptions::default(),
    )
    .expect("resolve");

    assert!(matches!(report.get("foo"), Some(Outcome::Skipped(_))));
    assert!(report.into_result().is_err());
}

#[test]
fn from_restricts_candidates_without_prompting() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman).with_search(&["foo 1"]);
    let snap = FakeManager::new(Source::Snap).with_search(&["foo 2"]);
    let ctx = context(dir.path(), &[&pacman, &snap]);

    let options = ResolveOptions {
        from: Some(Source::Snap),
        force: false,
    };
    let report = resolve_and_install(&ctx, &names(&["foo"]), &never, options).expect("resolve");

    assert!(matches!(report.get("foo"), Some(Outcome::Installed { source: Source::Snap, .. })));
}

#[test]
fn install_failure_is_reported_and_not_recorded() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman)
        .with_search(&["foo 1", "bar 1"])
        .failing("foo");
    let ctx = context(dir.path(), &[&pacman]);

    let report = resolve_and_install(
        &ctx,
        &names(&["foo", "bar"]),
        &never,
        ResolveOptions::default(),
    )
    .expect("resolve");

    assert!(matches!(report.get("foo"), Some(Outcome::Failed(_))));
    assert!(ctx.store.get("foo").expect("get").is_none());
    assert!(ctx.store.get("bar").expect("get").is_some());
}

#[test]
fn tracked_package_is_skipped_unless_forced() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman)
        .with_search(&["foo 2"])
        .with_latest("foo", "2");
    let ctx = context(dir.path(), &[&pacman]);
    ctx.store.upsert("foo", Source::Pacman, "1").expect("seed");

    let report = resolve_and_install(&ctx, &names(&["foo"]), &never, ResolveOptions::default())
        .expect("resolve");
    assert!(matches!(report.get("foo"), Some(Outcome::Skipped(_))));
    assert!(pacman.install_calls().is_empty());

    let forced = ResolveOptions {
        from: None,
        force: true,
    };
    resolve_and_install(&ctx, &names(&["foo"]), &never, forced).expect("forced");
    assert_eq!(
        ctx.store.get("foo").expect("get").map(|r| r.version),
        Some("2".to_string())
    );
}

#[test]
fn invalid_names_never_reach_a_backend() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman).with_search(&["x 1"]);
    let ctx = context(dir.path(), &[&pacman]);

    let report = resolve_and_install(
        &ctx,
        &names(&["foo; rm -rf /"]),
        &never,
        ResolveOptions::default(),
    )
    .expect("resolve");

    assert!(matches!(report.get("foo; rm -rf /"), Some(Outcome::Failed(_))));
    assert!(pacman.install_calls().is_empty());
}

#[test]
fn corrupt_store_aborts_the_batch() {
    let dir = tempdir().expect("tempdir");
    let pacman = FakeManager::new(Source::Pacman).with_search(&["foo 1"]);
    let ctx = context(dir.path(), &[&pacman]);
    fs::write(ctx.store.path(), "{not json").expect("corrupt");

    let err = resolve_and_install(&ctx, &names(&["foo"]), &never, ResolveOptions::default())
        .expect_err("store failure propagates");
    assert!(matches!(err, AllpacError::Persistence { .. }));
}
