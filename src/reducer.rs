use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::annotation::{NoopRowAnnotationFactory, RowAnnotationFactory};
use crate::finder::PatternFinder;
use crate::result::PatternFinderResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReduceError {
    #[error("nothing to reduce")]
    Empty,
    #[error("cannot reduce results for different columns: '{expected}' and '{found}'")]
    ColumnMismatch { expected: String, found: String },
    #[error("cannot reduce results with different group columns: {expected:?} and {found:?}")]
    GroupColumnMismatch {
        expected: Option<String>,
        found: Option<String>,
    },
    #[error("cannot reduce results built under different tokenizer configurations")]
    ConfigurationMismatch,
}

fn check_compatible(first: &PatternFinderResult, other: &PatternFinderResult) -> Result<(), ReduceError> {
    if first.column() != other.column() {
        return Err(ReduceError::ColumnMismatch {
            expected: first.column().to_string(),
            found: other.column().to_string(),
        });
    }
    if first.group_column() != other.group_column() {
        return Err(ReduceError::GroupColumnMismatch {
            expected: first.group_column().map(str::to_string),
            found: other.group_column().map(str::to_string),
        });
    }
    if !Arc::ptr_eq(first.config(), other.config()) && first.config() != other.config() {
        return Err(ReduceError::ConfigurationMismatch);
    }
    Ok(())
}

/// Merges partial results computed over disjoint partitions.
///
/// Every (group, pattern, count) row is replayed, in input order, into a fresh
/// engine per group using the pattern's own symbolic rendering as the token
/// sequence. Equal patterns add up their counts and compatible ones unify
/// through the usual widening. Count totals do not depend on the order of
/// `results`; retained samples and widened shapes may.
pub fn reduce(results: &[PatternFinderResult]) -> Result<PatternFinderResult, ReduceError> {
    let first = results.first().ok_or(ReduceError::Empty)?;
    for other in &results[1..] {
        check_compatible(first, other)?;
    }

    let config = first.config().clone();
    let annotations: Arc<dyn RowAnnotationFactory> = Arc::new(NoopRowAnnotationFactory::default());
    let mut finders: BTreeMap<Option<String>, PatternFinder> = BTreeMap::new();
    for result in results {
        for (group, crosstab) in result.groups() {
            let finder = finders
                .entry(group.map(str::to_string))
                .or_insert_with(|| PatternFinder::with_cache_capacity(config.clone(), annotations.clone(), 0));
            for row in crosstab.rows() {
                let probes = row.pattern().probe_tokens();
                finder.observe(&probes, row.sample(), row.match_count());
            }
        }
    }

    let groups: BTreeMap<_, _> = finders
        .into_iter()
        .map(|(group, finder)| (group, finder.into_crosstab()))
        .collect();
    let merged = PatternFinderResult::new(
        first.column().to_string(),
        first.group_column().map(str::to_string),
        config,
        groups,
    );
    info!(
        partials = results.len(),
        groups = merged.group_count(),
        patterns = merged.pattern_count(),
        "reduced pattern finder results"
    );
    Ok(merged)
}
