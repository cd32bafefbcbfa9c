//! The set of backend adapters a command works with, keyed by [`Source`].

use crate::config::Settings;
use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::packages::aur::{AurManager, AurRpc};
use crate::packages::command::CommandRunner;
use crate::packages::flatpak::FlatpakManager;
use crate::packages::pacman::PacmanManager;
use crate::packages::snap::SnapManager;
use crate::packages::traits::PackageManager;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Default)]
pub struct ManagerSet {
    managers: BTreeMap<Source, Box<dyn PackageManager>>,
}

impl ManagerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four real backends, wired from `settings`
    pub fn from_settings(settings: &Settings, cache_dir: PathBuf) -> Result<Self> {
        let runner = CommandRunner::new(settings.command_timeout);
        let query = CommandRunner::new(settings.search_timeout);
        let rpc = AurRpc::new(&settings.aur_url, settings.search_timeout)?;

        let mut set = Self::new();
        set.register(Box::new(PacmanManager::new(runner, query)));
        set.register(Box::new(SnapManager::new(runner, query)));
        set.register(Box::new(FlatpakManager::new(
            &settings.flatpak_remote,
            runner,
            query,
        )));
        set.register(Box::new(AurManager::new(
            rpc,
            &settings.aur_url,
            cache_dir,
            runner,
        )));
        Ok(set)
    }

    /// Add or replace the adapter for its source
    pub fn register(&mut self, manager: Box<dyn PackageManager>) {
        self.managers.insert(manager.source(), manager);
    }

    pub fn get(&self, source: Source) -> Result<&dyn PackageManager> {
        self.managers
            .get(&source)
            .map(|m| m.as_ref())
            .ok_or_else(|| AllpacError::backend(source, "no adapter registered"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn PackageManager> {
        self.managers.values().map(|m| m.as_ref())
    }

}
