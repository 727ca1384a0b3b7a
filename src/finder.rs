use std::sync::Arc;
use tracing::debug;

use crate::annotation::{InputRow, RowAnnotation, RowAnnotationFactory};
use crate::config::TokenizerConfiguration;
use crate::pattern::Pattern;
use crate::result::{Crosstab, PatternRow};
use crate::token::Token;
use crate::tokenizer::{tokenize, TokenCache};

pub const DEFAULT_TOKEN_CACHE_CAPACITY: usize = 4096;

#[derive(Debug, Clone)]
struct PatternEntry {
    pattern: Pattern,
    count: u64,
    annotation: Option<RowAnnotation>,
}

/// Incremental pattern discovery for one group of values.
///
/// Patterns are kept in discovery order and each value lands in the first
/// pattern that matches it; a value nothing matches founds a new pattern at
/// the end. The scan-then-append step is not synchronized, so one instance
/// must only be fed from one thread. Run separate instances over disjoint
/// partitions and [`reduce`](crate::reducer::reduce) their results instead.
pub struct PatternFinder {
    config: Arc<TokenizerConfiguration>,
    annotations: Arc<dyn RowAnnotationFactory>,
    entries: Vec<PatternEntry>,
    cache: Option<TokenCache>,
}

impl PatternFinder {
    pub fn new(config: Arc<TokenizerConfiguration>, annotations: Arc<dyn RowAnnotationFactory>) -> Self {
        Self::with_cache_capacity(config, annotations, DEFAULT_TOKEN_CACHE_CAPACITY)
    }

    /// A capacity of 0 disables the token cache.
    pub fn with_cache_capacity(
        config: Arc<TokenizerConfiguration>,
        annotations: Arc<dyn RowAnnotationFactory>,
        capacity: usize,
    ) -> Self {
        Self {
            config,
            annotations,
            entries: Vec::new(),
            cache: TokenCache::new(capacity),
        }
    }

    pub fn config(&self) -> &Arc<TokenizerConfiguration> {
        &self.config
    }

    /// Feeds one row, weighted by `distinct_count`. Returns the discovery
    /// index of the pattern the row was counted in.
    pub fn run(&mut self, row: &InputRow, distinct_count: u64) -> usize {
        let value = row.value_or_empty();
        let tokens: Arc<[Token]> = match self.cache.as_mut() {
            Some(cache) => cache.tokenize(value, &self.config),
            None => tokenize(value, &self.config).into(),
        };
        let (index, created) = self.observe(&tokens, value, distinct_count);

        let entry = &mut self.entries[index];
        if created {
            entry.annotation = Some(self.annotations.create_annotation());
        }
        if let Some(annotation) = entry.annotation {
            self.annotations.annotate(row, distinct_count, annotation);
        }
        index
    }

    /// Counts `tokens` against the first matching pattern or founds a new one
    /// with `sample` as its retained sample. Returns (index, created).
    pub(crate) fn observe(&mut self, tokens: &[Token], sample: &str, weight: u64) -> (usize, bool) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.pattern.match_tokens(tokens, &self.config) {
                entry.count += weight;
                return (index, false);
            }
        }
        let pattern = Pattern::from_tokens(tokens, sample, &self.config);
        debug!(pattern = %pattern, sample, "new pattern");
        self.entries.push(PatternEntry {
            pattern,
            count: weight,
            annotation: None,
        });
        (self.entries.len() - 1, true)
    }

    /// Patterns with their match counts, in discovery order.
    pub fn patterns(&self) -> impl Iterator<Item = (&Pattern, u64)> {
        self.entries.iter().map(|e| (&e.pattern, e.count))
    }

    pub fn pattern_count(&self) -> usize {
        self.entries.len()
    }

    pub fn match_count(&self, symbolic: &str) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.pattern.to_symbolic_string() == symbolic)
            .map(|e| e.count)
            .sum()
    }

    pub fn to_crosstab(&self) -> Crosstab {
        Crosstab::from_rows(
            self.entries
                .iter()
                .map(|e| PatternRow::new(e.pattern.clone(), e.count, e.annotation))
                .collect(),
        )
    }

    pub fn into_crosstab(self) -> Crosstab {
        Crosstab::from_rows(
            self.entries
                .into_iter()
                .map(|e| PatternRow::new(e.pattern, e.count, e.annotation))
                .collect(),
        )
    }
}
