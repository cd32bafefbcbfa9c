use crate::error::{AllpacError, Result};
use crate::project_identity;
use crate::state::types::PackageList;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Parse the package list at `path`.
///
/// `Ok(None)` when the file does not exist. A zero-length file counts as
/// `{}`. Unreadable or unparseable content is a persistence error: nothing
/// downstream can be trusted without the record, so it is never replaced
/// with a default here.
pub(super) fn read_package_list(path: &Path) -> Result<Option<PackageList>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(AllpacError::persistence(path, e)),
    };

    if content.trim().is_empty() {
        return Ok(Some(PackageList::new()));
    }

    serde_json::from_str::<PackageList>(&content)
        .map(Some)
        .map_err(|e| {
            AllpacError::persistence(
                path,
                format!(
                    "corrupted package list ({}). Hint: run `{}` to restore the last good copy",
                    e,
                    project_identity::cli_with("repair")
                ),
            )
        })
}
