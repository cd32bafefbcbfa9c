//! Choosing a backend when several have an exact match.

use crate::core::types::SourceResults;
use crate::ui as output;

/// Picks one of several exact-match candidates.
///
/// Returns an index into `candidates`, or `None` to skip the package. An
/// index past the end is treated like `None` by the caller.
pub trait SourceSelector {
    fn select(&self, package: &str, candidates: &[SourceResults]) -> Option<usize>;
}

impl<F> SourceSelector for F
where
    F: Fn(&str, &[SourceResults]) -> Option<usize>,
{
    fn select(&self, package: &str, candidates: &[SourceResults]) -> Option<usize> {
        self(package, candidates)
    }
}

/// Asks on the terminal
pub struct PromptSelector;

impl SourceSelector for PromptSelector {
    fn select(&self, package: &str, candidates: &[SourceResults]) -> Option<usize> {
        let options: Vec<String> = candidates.iter().map(describe_candidate).collect();
        output::prompt_choice(
            &format!("'{}' is available from several sources, pick one:", package),
            &options,
        )
    }
}

/// `--yes` without `--from`: never guess
pub struct NonInteractiveSelector;

impl SourceSelector for NonInteractiveSelector {
    fn select(&self, package: &str, candidates: &[SourceResults]) -> Option<usize> {
        output::warning(&format!(
            "'{}' matches {} sources; pass --from <source> to choose",
            package,
            candidates.len()
        ));
        None
    }
}

fn describe_candidate(candidate: &SourceResults) -> String {
    match candidate.entries.as_slice() {
        [] => candidate.source.label().to_string(),
        [only] => format!("{}: {}", candidate.source.label(), only),
        [first, rest @ ..] => format!(
            "{}: {} (+{} more)",
            candidate.source.label(),
            first,
            rest.len()
        ),
    }
}
