use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::annotation::RowAnnotation;
use crate::config::TokenizerConfiguration;
use crate::pattern::Pattern;

#[derive(Debug, Clone)]
pub struct PatternRow {
    pattern: Pattern,
    symbolic: String,
    match_count: u64,
    sample: String,
    annotation: Option<RowAnnotation>,
}

impl PatternRow {
    pub(crate) fn new(pattern: Pattern, match_count: u64, annotation: Option<RowAnnotation>) -> Self {
        Self {
            symbolic: pattern.to_symbolic_string(),
            sample: pattern.sample().to_string(),
            pattern,
            match_count,
            annotation,
        }
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn symbolic(&self) -> &str {
        &self.symbolic
    }

    pub fn match_count(&self) -> u64 {
        self.match_count
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn annotation(&self) -> Option<RowAnnotation> {
        self.annotation
    }
}

/// Highest count first, then symbolic string ascending.
pub(crate) fn rank(a: &PatternRow, b: &PatternRow) -> Ordering {
    b.match_count
        .cmp(&a.match_count)
        .then_with(|| a.symbolic.cmp(&b.symbolic))
}

/// Ranked pattern -> {match count, sample} table for one group.
#[derive(Debug, Clone, Default)]
pub struct Crosstab {
    rows: Vec<PatternRow>,
}

impl Crosstab {
    /// Builds the ranked table from rows in discovery order. Distinct patterns
    /// can render the same symbolic string (a `##` delimiter and a two digit
    /// number); those rows collapse into the first one with their counts summed.
    pub(crate) fn from_rows(rows: Vec<PatternRow>) -> Self {
        let mut index: AHashMap<String, usize> = AHashMap::with_capacity(rows.len());
        let mut merged: Vec<PatternRow> = Vec::with_capacity(rows.len());
        for row in rows {
            match index.get(&row.symbolic) {
                Some(&i) => merged[i].match_count += row.match_count,
                None => {
                    index.insert(row.symbolic.clone(), merged.len());
                    merged.push(row);
                }
            }
        }
        merged.sort_by(rank);
        Self { rows: merged }
    }

    pub fn rows(&self) -> &[PatternRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, symbolic: &str) -> Option<&PatternRow> {
        self.rows.iter().find(|r| r.symbolic == symbolic)
    }

    pub fn match_count(&self, symbolic: &str) -> u64 {
        self.get(symbolic).map_or(0, |r| r.match_count)
    }

    pub fn total_matches(&self) -> u64 {
        self.rows.iter().map(|r| r.match_count).sum()
    }
}

/// Output of one analysis (or of a reduce over several). Groups are keyed by
/// group value with the null group ordered first; an ungrouped result holds a
/// single `None` group.
#[derive(Debug, Clone)]
pub struct PatternFinderResult {
    column: String,
    group_column: Option<String>,
    config: Arc<TokenizerConfiguration>,
    groups: BTreeMap<Option<String>, Crosstab>,
}

impl PatternFinderResult {
    pub(crate) fn new(
        column: String,
        group_column: Option<String>,
        config: Arc<TokenizerConfiguration>,
        groups: BTreeMap<Option<String>, Crosstab>,
    ) -> Self {
        Self { column, group_column, config, groups }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn group_column(&self) -> Option<&str> {
        self.group_column.as_deref()
    }

    pub fn is_grouped(&self) -> bool {
        self.group_column.is_some()
    }

    pub fn config(&self) -> &Arc<TokenizerConfiguration> {
        &self.config
    }

    pub fn groups(&self) -> impl Iterator<Item = (Option<&str>, &Crosstab)> {
        self.groups.iter().map(|(k, v)| (k.as_deref(), v))
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn crosstab(&self, group: Option<&str>) -> Option<&Crosstab> {
        self.groups.get(&group.map(str::to_string))
    }

    /// The crosstab of an ungrouped result.
    pub fn single_crosstab(&self) -> Option<&Crosstab> {
        if self.is_grouped() {
            None
        } else {
            self.groups.get(&None)
        }
    }

    /// Number of pattern rows across all groups.
    pub fn pattern_count(&self) -> usize {
        self.groups.values().map(Crosstab::len).sum()
    }

    pub fn match_count(&self, symbolic: &str) -> u64 {
        self.groups.values().map(|c| c.match_count(symbolic)).sum()
    }

    /// Summed match count of several patterns; repeated keys count once.
    pub fn match_count_in<I, S>(&self, symbolics: I) -> u64
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        symbolics
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .unique()
            .map(|s| self.match_count(&s))
            .sum()
    }

    pub fn total_matches(&self) -> u64 {
        self.groups.values().map(Crosstab::total_matches).sum()
    }

    pub fn to_output(&self) -> PatternFinderOutput {
        PatternFinderOutput {
            column: self.column.clone(),
            group_column: self.group_column.clone(),
            pattern_count: self.pattern_count(),
            total_matches: self.total_matches(),
            groups: self
                .groups
                .iter()
                .map(|(group, crosstab)| GroupOut {
                    group: group.clone(),
                    pattern_count: crosstab.len(),
                    total_matches: crosstab.total_matches(),
                    patterns: crosstab
                        .rows()
                        .iter()
                        .map(|r| PatternOut {
                            pattern: r.symbolic.clone(),
                            match_count: r.match_count,
                            sample: r.sample.clone(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternOut {
    pub pattern: String,
    pub match_count: u64,
    pub sample: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOut {
    pub group: Option<String>,
    pub pattern_count: usize,
    pub total_matches: u64,
    pub patterns: Vec<PatternOut>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternFinderOutput {
    pub column: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_column: Option<String>,
    pub pattern_count: usize,
    pub total_matches: u64,
    pub groups: Vec<GroupOut>,
}
