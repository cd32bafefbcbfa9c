//! Rebuild command
//!
//! Discards the cached build of one AUR package, clones and builds it
//! again, and records the resulting version.

use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::traits::AppContext;
use crate::ui as output;
use tracing::info;

pub fn run(ctx: &AppContext, package: &str) -> Result<()> {
    output::info(&format!("Rebuilding {}", package));
    let version = rebuild(ctx, package)?;
    output::success(&format!("{} rebuilt at {}", package, version));
    Ok(())
}

pub fn rebuild(ctx: &AppContext, package: &str) -> Result<String> {
    let record = ctx
        .store
        .get(package)?
        .ok_or_else(|| AllpacError::NotFound(format!("'{}' is not tracked by allpac", package)))?;

    if record.source != Source::Aur {
        return Err(AllpacError::Other(format!(
            "'{}' was installed from {}; only AUR packages can be rebuilt",
            package,
            record.source.label()
        )));
    }

    let aur = ctx.managers.get(Source::Aur)?;
    aur.clean_cache(package)?;
    let version = aur.install(package)?;
    ctx.store.upsert(package, Source::Aur, version.as_str())?;
    info!(package, from = %record.version, to = %version, "rebuilt");
    Ok(version)
}
