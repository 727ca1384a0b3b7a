use ahash::AHashMap;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use crate::annotation::{InputRow, RowAnnotationFactory};
use crate::config::TokenizerConfiguration;
use crate::finder::{PatternFinder, DEFAULT_TOKEN_CACHE_CAPACITY};
use crate::reducer::{self, ReduceError};
use crate::result::{Crosstab, PatternFinderResult};

/// Dispatches rows to one [`PatternFinder`] per group value. Without a group
/// column every row goes to the single implicit group.
pub struct PatternFinderAnalyzer {
    column: String,
    group_column: Option<String>,
    config: Arc<TokenizerConfiguration>,
    annotations: Arc<dyn RowAnnotationFactory>,
    cache_capacity: usize,
    finders: AHashMap<Option<String>, PatternFinder>,
}

impl PatternFinderAnalyzer {
    pub fn new(
        column: impl Into<String>,
        config: Arc<TokenizerConfiguration>,
        annotations: Arc<dyn RowAnnotationFactory>,
    ) -> Self {
        Self {
            column: column.into(),
            group_column: None,
            config,
            annotations,
            cache_capacity: DEFAULT_TOKEN_CACHE_CAPACITY,
            finders: AHashMap::new(),
        }
    }

    pub fn with_group_column(mut self, group_column: impl Into<String>) -> Self {
        self.group_column = Some(group_column.into());
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn run(&mut self, row: &InputRow, distinct_count: u64) -> usize {
        let group = if self.group_column.is_some() { row.group.clone() } else { None };
        let finder = self.finders.entry(group).or_insert_with_key(|group| {
            debug!(group = ?group, "new group");
            PatternFinder::with_cache_capacity(
                self.config.clone(),
                self.annotations.clone(),
                self.cache_capacity,
            )
        });
        finder.run(row, distinct_count)
    }

    pub fn run_all<'a, I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = &'a InputRow>,
    {
        for row in rows {
            self.run(row, 1);
        }
    }

    pub fn result(&self) -> PatternFinderResult {
        let mut groups: BTreeMap<Option<String>, Crosstab> = self
            .finders
            .iter()
            .map(|(group, finder)| (group.clone(), finder.to_crosstab()))
            .collect();
        if self.group_column.is_none() {
            groups.entry(None).or_default();
        }
        let result = PatternFinderResult::new(
            self.column.clone(),
            self.group_column.clone(),
            self.config.clone(),
            groups,
        );
        if result.is_grouped() {
            info!(groups = result.group_count(), "grouped result contains {} groups", result.group_count());
        }
        result
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisOpts {
    pub column: String,
    pub group_column: Option<String>,
    pub partitions: usize,
    pub cache_capacity: usize,
}

impl Default for AnalysisOpts {
    fn default() -> Self {
        Self {
            column: "value".to_string(),
            group_column: None,
            partitions: num_cpus::get(),
            cache_capacity: DEFAULT_TOKEN_CACHE_CAPACITY,
        }
    }
}

impl AnalysisOpts {
    pub fn analyzer(
        &self,
        config: Arc<TokenizerConfiguration>,
        annotations: Arc<dyn RowAnnotationFactory>,
    ) -> PatternFinderAnalyzer {
        let analyzer = PatternFinderAnalyzer::new(self.column.clone(), config, annotations)
            .with_cache_capacity(self.cache_capacity);
        match &self.group_column {
            Some(group_column) => analyzer.with_group_column(group_column.clone()),
            None => analyzer,
        }
    }
}

/// Splits `rows` into up to `opts.partitions` contiguous slices, analyzes them
/// in parallel with independent analyzers and reduces the partial results.
///
/// `annotations` still sees every row of every partition, but the returned
/// rows carry no annotation handle: [`reducer::reduce`] drops the per-partition
/// handles, so `PatternRow::annotation` is always `None` here. Use a single
/// [`PatternFinderAnalyzer`] when the handles are needed.
pub fn analyze_partitioned(
    rows: &[InputRow],
    opts: &AnalysisOpts,
    config: Arc<TokenizerConfiguration>,
    annotations: Arc<dyn RowAnnotationFactory>,
) -> Result<PatternFinderResult, ReduceError> {
    if rows.is_empty() {
        return Ok(opts.analyzer(config, annotations).result());
    }
    let partitions = opts.partitions.max(1);
    let chunk_size = rows.len().div_ceil(partitions).max(1);
    let partials: Vec<PatternFinderResult> = rows
        .par_chunks(chunk_size)
        .map(|slice| {
            let mut analyzer = opts.analyzer(config.clone(), annotations.clone());
            analyzer.run_all(slice);
            analyzer.result()
        })
        .collect();
    debug!(partitions = partials.len(), rows = rows.len(), "partitions analyzed");
    reducer::reduce(&partials)
}
