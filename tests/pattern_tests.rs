use patternscope::{
    tokenize, InputRow, NoopRowAnnotationFactory, Pattern, PatternFinder, RowAnnotationFactory,
    TokenizerConfiguration,
};
use std::sync::Arc;

fn find(values: &[&str], config: TokenizerConfiguration) -> PatternFinder {
    let annotations: Arc<dyn RowAnnotationFactory> = Arc::new(NoopRowAnnotationFactory::default());
    let mut finder = PatternFinder::new(Arc::new(config), annotations);
    for (i, v) in values.iter().enumerate() {
        finder.run(&InputRow::new(i as u64, Some(*v)), 1);
    }
    finder
}

fn shapes(finder: &PatternFinder) -> Vec<(String, u64)> {
    finder
        .patterns()
        .map(|(p, count)| (p.to_symbolic_string(), count))
        .collect()
}

#[test]
fn codes_collapse_into_one_widened_pattern() {
    let finder = find(&["AB-123", "CD-456", "EF-78"], TokenizerConfiguration::default());
    assert_eq!(shapes(&finder), vec![("AA-###".to_string(), 3)]);
}

#[test]
fn lower_and_leading_upper_words_stay_apart() {
    let config = TokenizerConfiguration::builder()
        .discriminate_text_case(true)
        .lower_case_expandable(false)
        .build()
        .unwrap();
    let finder = find(&["hello world", "Hi there"], config);
    assert_eq!(
        shapes(&finder),
        vec![
            ("aaaaa aaaaa".to_string(), 1),
            ("Aa aaaaa".to_string(), 1),
        ]
    );
}

#[test]
fn pattern_matches_its_own_tokens() {
    let configs = vec![
        TokenizerConfiguration::default(),
        TokenizerConfiguration::builder()
            .lower_case_expandable(false)
            .discriminate_negative_numbers(true)
            .ignore_repeated_spaces(true)
            .builtin_token("EMAIL")
            .build()
            .unwrap(),
    ];
    let values = ["", "AB-123", "-3.75 kg", "Hello  World", "x1y2", "ping a@b.io", "  "];
    for config in &configs {
        for value in values {
            let tokens = tokenize(value, config);
            let mut pattern = Pattern::from_tokens(&tokens, value, config);
            assert!(pattern.accepts(&tokens, config), "{value:?} must match its own pattern");
            let before = pattern.to_symbolic_string();
            assert!(pattern.match_tokens(&tokens, config));
            assert_eq!(pattern.to_symbolic_string(), before);
        }
    }
}

#[test]
fn cardinality_mismatch_does_not_match() {
    let config = TokenizerConfiguration::default();
    let pattern = Pattern::from_tokens(&tokenize("ab cd", &config), "ab cd", &config);
    assert!(!pattern.accepts(&tokenize("ab", &config), &config));
    assert!(!pattern.accepts(&tokenize("ab cd ef", &config), &config));
}

#[test]
fn lower_case_symbols_widen_and_never_narrow() {
    let config = TokenizerConfiguration::default();
    let mut pattern = Pattern::from_tokens(&tokenize("abc", &config), "abc", &config);
    assert!(pattern.match_tokens(&tokenize("abcdef", &config), &config));
    assert_eq!(pattern.to_symbolic_string(), "aaaaaa");
    assert!(pattern.match_tokens(&tokenize("ab", &config), &config));
    assert_eq!(pattern.to_symbolic_string(), "aaaaaa");
    assert_eq!(pattern.sample(), "abc");
}

#[test]
fn upper_case_symbols_keep_their_length() {
    let finder = find(&["AB", "ABC", "XY"], TokenizerConfiguration::default());
    assert_eq!(
        shapes(&finder),
        vec![("AA".to_string(), 2), ("AAA".to_string(), 1)]
    );
}

#[test]
fn case_blind_text_renders_lower() {
    let config = TokenizerConfiguration::builder()
        .discriminate_text_case(false)
        .build()
        .unwrap();
    let finder = find(&["Hello", "world"], config);
    assert_eq!(shapes(&finder), vec![("aaaaa".to_string(), 2)]);
}

#[test]
fn whitespace_identity_is_discriminated_by_default() {
    let finder = find(&["a b", "a  b"], TokenizerConfiguration::default());
    assert_eq!(finder.pattern_count(), 2);

    let config = TokenizerConfiguration::builder()
        .ignore_repeated_spaces(true)
        .build()
        .unwrap();
    let finder = find(&["a b", "a  b"], config);
    assert_eq!(shapes(&finder), vec![("a  b".to_string(), 2)]);
}

#[test]
fn decimals_are_discriminated_unless_disabled() {
    let finder = find(&["1.5", "15"], TokenizerConfiguration::default());
    assert_eq!(
        shapes(&finder),
        vec![("#.#".to_string(), 1), ("##".to_string(), 1)]
    );

    let config = TokenizerConfiguration::builder()
        .discriminate_decimals(false)
        .build()
        .unwrap();
    let finder = find(&["1.5", "15"], config);
    assert_eq!(shapes(&finder), vec![("###".to_string(), 2)]);
}

#[test]
fn negative_numbers_when_enabled() {
    let config = TokenizerConfiguration::builder()
        .discriminate_negative_numbers(true)
        .build()
        .unwrap();
    let finder = find(&["-5", "5", "-42"], config);
    assert_eq!(
        shapes(&finder),
        vec![("-##".to_string(), 2), ("#".to_string(), 1)]
    );
}

#[test]
fn mixed_tokens_render_as_question_marks() {
    let finder = find(&["A1B2", "C3D4"], TokenizerConfiguration::default());
    assert_eq!(shapes(&finder), vec![("????".to_string(), 2)]);
}

#[test]
fn predefined_tokens_render_bracketed_name() {
    let config = TokenizerConfiguration::builder()
        .predefined_token("EMAIL", [r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+"])
        .build()
        .unwrap();
    let finder = find(&["id: x@y.org", "id: foo.bar@example.com"], config);
    assert_eq!(shapes(&finder), vec![("aa: [EMAIL]".to_string(), 2)]);
}
