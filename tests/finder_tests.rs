use patternscope::{
    InMemoryRowAnnotationFactory, InputRow, NoopRowAnnotationFactory, PatternFinder,
    RowAnnotationFactory, TokenizerConfiguration,
};
use std::sync::Arc;

fn noop() -> Arc<dyn RowAnnotationFactory> {
    Arc::new(NoopRowAnnotationFactory::default())
}

fn finder() -> PatternFinder {
    PatternFinder::new(Arc::new(TokenizerConfiguration::default()), noop())
}

#[test]
fn run_returns_discovery_index() {
    let mut f = finder();
    assert_eq!(f.run(&InputRow::new(0, Some("1")), 1), 0);
    assert_eq!(f.run(&InputRow::new(1, Some("x")), 1), 1);
    assert_eq!(f.run(&InputRow::new(2, Some("22")), 1), 0);
    assert_eq!(f.pattern_count(), 2);
    assert_eq!(f.match_count("##"), 2);
    assert_eq!(f.match_count("a"), 1);
}

#[test]
fn annotations_record_matching_rows() {
    let factory = Arc::new(InMemoryRowAnnotationFactory::new());
    let annotations: Arc<dyn RowAnnotationFactory> = factory.clone();
    let mut f = PatternFinder::new(Arc::new(TokenizerConfiguration::default()), annotations);
    for (id, v) in ["AB-1", "hello", "CD-22"].iter().enumerate() {
        f.run(&InputRow::new(id as u64, Some(*v)), 1);
    }

    let crosstab = f.to_crosstab();
    let codes = crosstab.get("AA-##").expect("code pattern");
    let words = crosstab.get("aaaaa").expect("word pattern");
    let codes_annotation = codes.annotation().expect("annotated");
    let words_annotation = words.annotation().expect("annotated");

    assert_eq!(factory.annotation_count(), 2);
    assert_eq!(factory.row_ids(codes_annotation), vec![0, 2]);
    assert_eq!(factory.row_count(codes_annotation), 2);
    assert_eq!(factory.row_ids(words_annotation), vec![1]);
}

#[test]
fn annotation_row_ids_are_capped() {
    let factory = Arc::new(InMemoryRowAnnotationFactory::with_max_rows(2));
    let annotations: Arc<dyn RowAnnotationFactory> = factory.clone();
    let mut f = PatternFinder::new(Arc::new(TokenizerConfiguration::default()), annotations);
    for id in 0..5 {
        f.run(&InputRow::new(id, Some("42")), 1);
    }
    let annotation = f.to_crosstab().rows()[0].annotation().expect("annotated");
    assert_eq!(factory.row_count(annotation), 5);
    assert_eq!(factory.row_ids(annotation), vec![0, 1]);
}

#[test]
fn distinct_count_weights_the_row() {
    let factory = Arc::new(InMemoryRowAnnotationFactory::new());
    let annotations: Arc<dyn RowAnnotationFactory> = factory.clone();
    let mut f = PatternFinder::new(Arc::new(TokenizerConfiguration::default()), annotations);
    f.run(&InputRow::new(0, Some("abc")), 5);
    f.run(&InputRow::new(1, Some("xyz")), 2);

    let crosstab = f.to_crosstab();
    assert_eq!(crosstab.match_count("aaa"), 7);
    let annotation = crosstab.rows()[0].annotation().expect("annotated");
    assert_eq!(factory.row_count(annotation), 7);
    assert_eq!(factory.row_ids(annotation), vec![0, 1]);
}

#[test]
fn first_value_is_kept_as_sample() {
    let mut f = finder();
    f.run(&InputRow::new(0, Some("abc")), 1);
    f.run(&InputRow::new(1, Some("abcdef")), 1);
    let crosstab = f.to_crosstab();
    let row = &crosstab.rows()[0];
    assert_eq!(row.symbolic(), "aaaaaa");
    assert_eq!(row.sample(), "abc");
}

#[test]
fn missing_and_empty_values_share_the_empty_pattern() {
    let mut f = finder();
    f.run(&InputRow::new(0, None), 1);
    f.run(&InputRow::new(1, Some("")), 1);
    f.run(&InputRow::new(2, Some("x")), 1);
    let crosstab = f.to_crosstab();
    let empty = crosstab.get("").expect("empty pattern");
    assert_eq!(empty.match_count(), 2);
    assert_eq!(empty.sample(), "");
    assert_eq!(crosstab.total_matches(), 3);
}

#[test]
fn same_input_same_output() {
    let values = ["AB-1", "x", "1.5", "-3", "Hello World", "AB-1", "q9", ""];
    let render = || {
        let mut f = finder();
        for (id, v) in values.iter().enumerate() {
            f.run(&InputRow::new(id as u64, Some(*v)), 1);
        }
        f.to_crosstab()
            .rows()
            .iter()
            .map(|r| (r.symbolic().to_string(), r.match_count(), r.sample().to_string()))
            .collect::<Vec<_>>()
    };
    assert_eq!(render(), render());
}

#[test]
fn cache_does_not_change_results() {
    let config = Arc::new(TokenizerConfiguration::default());
    let mut cached = PatternFinder::with_cache_capacity(config.clone(), noop(), 2);
    let mut uncached = PatternFinder::with_cache_capacity(config, noop(), 0);
    for (id, v) in ["a1", "b", "a1", "cc", "b", "a1"].iter().enumerate() {
        let row = InputRow::new(id as u64, Some(*v));
        assert_eq!(cached.run(&row, 1), uncached.run(&row, 1));
    }
    let shapes = |f: &PatternFinder| {
        f.patterns()
            .map(|(p, c)| (p.to_symbolic_string(), c))
            .collect::<Vec<_>>()
    };
    assert_eq!(shapes(&cached), shapes(&uncached));
}

#[test]
fn crosstab_has_one_row_per_symbolic_string() {
    let mut f = finder();
    for (id, v) in ["?", "??", "a1"].iter().enumerate() {
        f.run(&InputRow::new(id as u64, Some(*v)), 1);
    }
    assert_eq!(f.pattern_count(), 3);

    let crosstab = f.to_crosstab();
    let rows: Vec<(&str, u64, &str)> = crosstab
        .rows()
        .iter()
        .map(|r| (r.symbolic(), r.match_count(), r.sample()))
        .collect();
    assert_eq!(rows, vec![("??", 2, "??"), ("?", 1, "?")]);
    assert_eq!(crosstab.len(), 2);
}
