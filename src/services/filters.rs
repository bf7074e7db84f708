use crate::models::scan::{Issue, Level};
use std::collections::BTreeSet;

/// Distinct facet values present in the current issue set, used to populate
/// filter options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FacetSet {
    pub severities: BTreeSet<Level>,
    pub confidences: BTreeSet<Level>,
    /// Sorted, deduplicated categories. Cascading: derived only from issues
    /// that pass the current severity/confidence selection.
    pub issue_types: Vec<String>,
}

/// Active filter selection. `issue_type: None` means "no filter".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub severities: BTreeSet<Level>,
    pub confidences: BTreeSet<Level>,
    pub issue_type: Option<String>,
}

/// Coarse category for an issue: uppercase the first character of the
/// details text, drop a single trailing period, keep the text before the
/// first remaining period.
///
/// A display heuristic over free text, not a guaranteed classification.
pub fn issue_category(details: &str) -> String {
    let mut chars = details.chars();
    let capitalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    let cleaned = capitalized.strip_suffix('.').unwrap_or(&capitalized);
    match cleaned.split_once('.') {
        Some((category, _)) => category.to_string(),
        None => cleaned.to_string(),
    }
}

/// Facets present in `issues` under the current `selection`. Severity and
/// confidence facets come from the full set; issue types only from the
/// subset surviving the level filters.
pub fn derive_facets(issues: &[Issue], selection: &FilterSelection) -> FacetSet {
    let severities = issues.iter().map(|issue| issue.severity).collect();
    let confidences = issues.iter().map(|issue| issue.confidence).collect();

    let mut issue_types: Vec<String> = issues
        .iter()
        .filter(|issue| selection.severities.contains(&issue.severity))
        .filter(|issue| selection.confidences.contains(&issue.confidence))
        .map(|issue| issue_category(&issue.details))
        .collect();
    issue_types.sort();
    issue_types.dedup();

    FacetSet {
        severities,
        confidences,
        issue_types,
    }
}

/// Default selection for a freshly loaded result: every level present, but
/// LOW is dropped when other levels exist so low-signal findings stay hidden
/// until the user opts back in. A lone LOW stays selected so the view is
/// never empty. Issue type starts unfiltered.
pub fn default_selection(issues: &[Issue]) -> FilterSelection {
    FilterSelection {
        severities: trim_low(issues.iter().map(|issue| issue.severity).collect()),
        confidences: trim_low(issues.iter().map(|issue| issue.confidence).collect()),
        issue_type: None,
    }
}

fn trim_low(mut levels: BTreeSet<Level>) -> BTreeSet<Level> {
    if levels.len() > 1 {
        levels.remove(&Level::Low);
    }
    levels
}

/// Conjunctive filtering: an issue passes when its severity and confidence
/// are both selected and, if an issue type is set, its details start with
/// that category (case-insensitive). Input order is preserved.
pub fn apply_filters(issues: &[Issue], selection: &FilterSelection) -> Vec<Issue> {
    issues
        .iter()
        .filter(|issue| selection.severities.contains(&issue.severity))
        .filter(|issue| selection.confidences.contains(&issue.confidence))
        .filter(|issue| match &selection.issue_type {
            Some(category) => issue
                .details
                .to_lowercase()
                .starts_with(&category.to_lowercase()),
            None => true,
        })
        .cloned()
        .collect()
}
