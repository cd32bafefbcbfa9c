//! Shared dependencies handed to every command.
//!
//! Commands take an [`AppContext`] instead of opening the package list or
//! constructing backends themselves, so tests can swap in a temp-dir store
//! and in-memory adapters.

use crate::config::Settings;
use crate::error::Result;
use crate::packages::ManagerSet;
use crate::state::RecordStore;
use crate::utils::paths;
use std::path::PathBuf;

pub struct AppContext {
    pub store: RecordStore,
    pub managers: ManagerSet,
    pub settings: Settings,
    /// AUR clone/build cache
    pub cache_dir: PathBuf,
}

impl AppContext {
    pub fn new(
        store: RecordStore,
        managers: ManagerSet,
        settings: Settings,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            managers,
            settings,
            cache_dir,
        }
    }

    /// Real store and backends under the allpac home directory
    pub fn from_settings(settings: Settings) -> Result<Self> {
        let cache_dir = paths::cache_dir()?;
        let store = RecordStore::open_default()?;
        let managers = ManagerSet::from_settings(&settings, cache_dir.clone())?;
        Ok(Self::new(store, managers, settings, cache_dir))
    }
}
