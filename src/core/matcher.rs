//! Exact-name matching for search results
//!
//! Backend search primitives return fuzzy or substring matches: searching
//! `foo` on pacman also yields `foobar`, `libfoo` and so on. Installing one of
//! those by accident is worse than installing nothing, so before a package is
//! resolved every raw line is checked against an anchored pattern:
//!
//! - the line starts with the requested name,
//! - optionally followed by a version suffix (`-1`, `-2.0.1`, `-1:2.0-3`)
//!   or `-dev`, ending the token,
//! - optionally followed by whitespace and free-form text (version,
//!   separator, description).
//!
//! `foo - a tool` and `foo-dev - headers` match `foo`; `foobar - other` and
//! `libfoo` do not.

use crate::core::types::{SearchResult, SourceResults};
use crate::utils::regex_cache::get_cached_regex;

/// Anchored pattern for one requested package name
pub fn exact_match_pattern(package_name: &str) -> String {
    format!(
        r"^{}(?:-(?:\d+:)?\d[\d.]*(?:-\d+)?|-dev)?(?:\s.*)?$",
        regex::escape(package_name)
    )
}

/// Whether a raw search line names exactly `package_name`
pub fn is_exact_match(package_name: &str, line: &str) -> bool {
    if package_name.is_empty() {
        return false;
    }
    match get_cached_regex(&exact_match_pattern(package_name)) {
        Ok(re) => re.is_match(line.trim()),
        Err(_) => false,
    }
}

/// Keep only exact matches; backends left with nothing are dropped.
///
/// Output order follows the input order, which callers keep in
/// [`Source`](crate::core::types::Source) order so candidate indices are
/// stable.
pub fn filter_exact_matches(result: &SearchResult) -> Vec<SourceResults> {
    result
        .results
        .iter()
        .filter_map(|source_result| {
            let entries: Vec<String> = source_result
                .entries
                .iter()
                .filter(|line| is_exact_match(&result.package_name, line))
                .cloned()
                .collect();
            if entries.is_empty() {
                None
            } else {
                Some(SourceResults {
                    source: source_result.source,
                    entries,
                })
            }
        })
        .collect()
}
