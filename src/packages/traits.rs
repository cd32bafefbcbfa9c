use crate::core::types::Source;
use crate::error::Result;

/// How a backend applies upgrades for several stale packages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    /// One upgrade call for the whole stale set
    Batch,
    /// One upgrade call per package, each isolated from the others
    PerPackage,
}

/// A backend adapter.
///
/// Versions are opaque strings compared only for equality. Any subprocess
/// or network failure surfaces as an error; "the backend has no such
/// package" is [`AllpacError::NotFound`](crate::error::AllpacError::NotFound).
pub trait PackageManager: Send + Sync {
    fn source(&self) -> Source;

    /// Whether the backend's tooling exists on this machine
    fn is_available(&self) -> bool;

    /// Raw catalog lines for `query`, normalized to start with the package
    /// name. An empty result is not an error.
    fn search(&self, query: &str) -> Result<Vec<String>>;

    /// Newest version the backend would install
    fn latest_version(&self, package: &str) -> Result<String>;

    /// Install `package` and report the version that ended up installed
    fn install(&self, package: &str) -> Result<String>;

    fn uninstall(&self, package: &str) -> Result<()>;

    /// Upgrade the given packages to their latest versions
    fn upgrade(&self, packages: &[String]) -> Result<()>;

    fn update_strategy(&self) -> UpdateStrategy {
        UpdateStrategy::Batch
    }

    /// Drop any on-disk build artifacts kept for `package`
    fn clean_cache(&self, _package: &str) -> Result<()> {
        Ok(())
    }
}
