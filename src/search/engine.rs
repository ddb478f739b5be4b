use super::heuristic::HeuristicRules;
use super::index::SearchIndex;
use crate::content::types::ContentRecord;

use std::collections::HashSet;

/// Caps applied while running a query.
#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    pub result_cap: usize,
    pub field_limit: usize,
}

/// Returns the trimmed query when it is worth searching for.
pub fn validate_query(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

/// Runs the heuristic tier and the tokenized tier and merges them.
///
/// Heuristic hits come first, then title, tag and intro hits. Each URL appears once,
/// at the position of whichever tier produced it first. The result never exceeds
/// `options.result_cap`.
pub fn execute_query<'a>(
    index: &'a SearchIndex,
    rules: &HeuristicRules,
    query: Option<&str>,
    options: QueryOptions,
) -> Vec<&'a ContentRecord> {
    let Some(query) = validate_query(query) else {
        return Vec::new();
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged: Vec<&ContentRecord> = Vec::new();

    let heuristic_hits = rules.heuristic_match(query, index.documents());
    let heuristic_count = heuristic_hits.len();
    for record in heuristic_hits {
        if seen.insert(record.url.as_str()) {
            merged.push(record);
        }
    }

    let field_hits = index.search(query, options.field_limit);
    let tokenized_count: usize = field_hits.iter().map(|group| group.hits.len()).sum();
    for group in field_hits {
        tracing::trace!("Field '{}' matched {} records", group.field.name(), group.hits.len());
        for record in group.hits {
            if seen.insert(record.url.as_str()) {
                merged.push(record);
            }
        }
    }

    merged.truncate(options.result_cap);

    tracing::debug!(
        "Query '{}': {} heuristic hits, {} tokenized hits, {} returned",
        query,
        heuristic_count,
        tokenized_count,
        merged.len()
    );

    merged
}
