//! In-memory backend used by the command tests.

use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::packages::traits::{PackageManager, UpdateStrategy};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct FakeState {
    search_lines: Vec<String>,
    search_fails: bool,
    batch_fails: bool,
    latest: HashMap<String, String>,
    installed: HashMap<String, String>,
    failing: HashSet<String>,
    install_calls: Vec<String>,
    uninstall_calls: Vec<String>,
    upgrade_calls: Vec<Vec<String>>,
    cleaned: Vec<String>,
}

/// Clones share state, so a test can keep a handle after registering one.
#[derive(Clone)]
pub struct FakeManager {
    source: Source,
    strategy: UpdateStrategy,
    state: Arc<Mutex<FakeState>>,
}

impl FakeManager {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            strategy: UpdateStrategy::Batch,
            state: Arc::default(),
        }
    }

    pub fn per_package(mut self) -> Self {
        self.strategy = UpdateStrategy::PerPackage;
        self
    }

    pub fn with_search(self, lines: &[&str]) -> Self {
        self.state().search_lines = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_latest(self, package: &str, version: &str) -> Self {
        self.set_latest(package, version);
        self
    }

    /// install, uninstall and upgrade of `package` fail
    pub fn failing(self, package: &str) -> Self {
        self.state().failing.insert(package.to_string());
        self
    }

    pub fn failing_search(self) -> Self {
        self.state().search_fails = true;
        self
    }

    pub fn failing_batch(self) -> Self {
        self.state().batch_fails = true;
        self
    }

    pub fn set_latest(&self, package: &str, version: &str) {
        self.state()
            .latest
            .insert(package.to_string(), version.to_string());
    }

    pub fn install_calls(&self) -> Vec<String> {
        self.state().install_calls.clone()
    }

    pub fn uninstall_calls(&self) -> Vec<String> {
        self.state().uninstall_calls.clone()
    }

    pub fn upgrade_calls(&self) -> Vec<Vec<String>> {
        self.state().upgrade_calls.clone()
    }

    pub fn cleaned(&self) -> Vec<String> {
        self.state().cleaned.clone()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake state poisoned")
    }
}

impl PackageManager for FakeManager {
    fn source(&self) -> Source {
        self.source
    }

    fn is_available(&self) -> bool {
        true
    }

    fn search(&self, _query: &str) -> Result<Vec<String>> {
        let state = self.state();
        if state.search_fails {
            return Err(AllpacError::backend(self.source, "search unavailable"));
        }
        Ok(state.search_lines.clone())
    }

    fn latest_version(&self, package: &str) -> Result<String> {
        self.state()
            .latest
            .get(package)
            .cloned()
            .ok_or_else(|| AllpacError::NotFound(package.to_string()))
    }

    fn install(&self, package: &str) -> Result<String> {
        let mut state = self.state();
        state.install_calls.push(package.to_string());
        if state.failing.contains(package) {
            return Err(AllpacError::backend(self.source, format!("{} failed", package)));
        }
        let version = state
            .latest
            .get(package)
            .cloned()
            .unwrap_or_else(|| "1.0".to_string());
        state.installed.insert(package.to_string(), version.clone());
        Ok(version)
    }

    fn uninstall(&self, package: &str) -> Result<()> {
        let mut state = self.state();
        state.uninstall_calls.push(package.to_string());
        if state.failing.contains(package) {
            return Err(AllpacError::backend(self.source, format!("{} failed", package)));
        }
        state.installed.remove(package);
        Ok(())
    }

    fn upgrade(&self, packages: &[String]) -> Result<()> {
        let mut state = self.state();
        state.upgrade_calls.push(packages.to_vec());
        if state.batch_fails {
            return Err(AllpacError::backend(self.source, "batch update failed"));
        }
        if let Some(bad) = packages.iter().find(|p| state.failing.contains(*p)) {
            return Err(AllpacError::backend(self.source, format!("{} failed", bad)));
        }
        for package in packages {
            if let Some(version) = state.latest.get(package).cloned() {
                state.installed.insert(package.clone(), version);
            }
        }
        Ok(())
    }

    fn update_strategy(&self) -> UpdateStrategy {
        self.strategy
    }

    fn clean_cache(&self, package: &str) -> Result<()> {
        self.state().cleaned.push(package.to_string());
        Ok(())
    }
}
