//! Package search command
//!
//! Queries every backend in parallel and prints the raw results per source,
//! with exact name matches highlighted.

use crate::core::matcher::is_exact_match;
use crate::core::types::{SearchFailure, SearchResult, SourceResults};
use crate::error::Result;
use crate::packages::{ManagerSet, PackageManager};
use crate::traits::AppContext;
use crate::ui as output;
use crate::utils::sanitize::validate_package_name;
use colored::Colorize;
use rayon::prelude::*;
use tracing::{debug, warn};

pub struct SearchOptions {
    pub query: String,
}

/// Search all backends concurrently and join the results.
///
/// A backend whose search fails is logged and listed in
/// [`SearchResult::failures`]; the others still contribute. Backends whose
/// tools are not installed are left out.
pub fn search_all(managers: &ManagerSet, name: &str) -> SearchResult {
    let backends: Vec<&dyn PackageManager> = managers
        .iter()
        .filter(|manager| {
            let available = manager.is_available();
            if !available {
                debug!(source = %manager.source(), "backend tools missing, not searched");
            }
            available
        })
        .collect();
    let outcomes: Vec<_> = backends
        .par_iter()
        .map(|manager| (manager.source(), manager.search(name)))
        .collect();

    let mut result = SearchResult::new(name);
    for (source, outcome) in outcomes {
        match outcome {
            Ok(entries) => result.results.push(SourceResults { source, entries }),
            Err(e) => {
                warn!(source = %source, query = name, error = %e, "search failed");
                result.failures.push(SearchFailure {
                    source,
                    message: e.to_string(),
                });
            }
        }
    }
    result
}

pub fn run(ctx: &AppContext, options: SearchOptions) -> Result<()> {
    validate_package_name(&options.query)?;
    let result = search_all(&ctx.managers, &options.query);

    for source_results in &result.results {
        if source_results.entries.is_empty() {
            continue;
        }
        output::header(source_results.source.label());
        for line in &source_results.entries {
            if is_exact_match(&options.query, line) {
                output::indent(&line.bold().to_string(), 1);
            } else {
                output::indent(line, 1);
            }
        }
    }

    for failure in &result.failures {
        output::warning(&format!(
            "{} search failed: {}",
            failure.source.label(),
            failure.message
        ));
    }

    if result.is_empty() {
        output::info(&format!("No results for '{}'", options.query));
    }
    Ok(())
}
