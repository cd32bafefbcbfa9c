//! Fixtures shared by the command tests.

use crate::config::Settings;
use crate::packages::ManagerSet;
use crate::packages::fake::FakeManager;
use crate::state::RecordStore;
use crate::traits::AppContext;
use std::path::Path;

/// Context backed by a store under `dir` and the given fake backends
pub fn context(dir: &Path, fakes: &[&FakeManager]) -> AppContext {
    let store = RecordStore::open(dir.join("pkg.list")).expect("open store");
    let mut managers = ManagerSet::new();
    for fake in fakes {
        managers.register(Box::new((*fake).clone()));
    }
    AppContext::new(store, managers, Settings::default(), dir.join("cache"))
}
