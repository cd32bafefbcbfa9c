use crate::core::types::Source;
use crate::error::Result;
use crate::state::RecordStore;
use crate::ui as output;
use colored::Colorize;

/// Options for the list command
pub struct ListOptions {
    pub source: Option<Source>,
}

pub fn run(store: &RecordStore, options: ListOptions) -> Result<()> {
    let list = store.load()?;
    let grouped = list.names_by_source();

    let mut shown = 0;
    for (source, names) in &grouped {
        if options.source.is_some_and(|only| only != *source) {
            continue;
        }
        output::header(&format!("{} ({})", source.label(), names.len()));
        for name in names {
            let version = list.get(name).map(|r| r.version.as_str()).unwrap_or_default();
            output::indent(&format!("{} {}", name.bold(), version.dimmed()), 1);
        }
        shown += names.len();
    }

    if shown == 0 {
        output::info("No packages installed through allpac");
    }
    Ok(())
}
