use patternscope::token::TokenType;
use patternscope::{tokenize, Token, TokenizerConfiguration};

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text()).collect()
}

fn types(tokens: &[Token]) -> Vec<TokenType> {
    tokens.iter().map(|t| t.token_type()).collect()
}

#[test]
fn empty_value_has_no_tokens() {
    let config = TokenizerConfiguration::default();
    assert!(tokenize("", &config).is_empty());
}

#[test]
fn splits_code_into_text_delim_number() {
    let config = TokenizerConfiguration::default();
    let tokens = tokenize("AB-123", &config);
    assert_eq!(texts(&tokens), vec!["AB", "-", "123"]);
    assert_eq!(types(&tokens), vec![TokenType::Text, TokenType::Delim, TokenType::Number]);
    assert_eq!(tokens[2].len(), 3);
}

#[test]
fn text_is_split_on_case_changes_only_when_discriminated() {
    let config = TokenizerConfiguration::default();
    assert_eq!(texts(&tokenize("Hello", &config)), vec!["H", "ello"]);

    let no_case = TokenizerConfiguration::builder()
        .discriminate_text_case(false)
        .build()
        .unwrap();
    assert_eq!(texts(&tokenize("Hello", &no_case)), vec!["Hello"]);
}

#[test]
fn minus_sign_and_decimal_separator_belong_to_numbers() {
    let config = TokenizerConfiguration::default();
    let tokens = tokenize("-12.5 apples", &config);
    assert_eq!(texts(&tokens), vec!["-12.5", " ", "apples"]);
    assert_eq!(
        types(&tokens),
        vec![TokenType::Number, TokenType::Whitespace, TokenType::Text]
    );
}

#[test]
fn dashes_between_numbers_stay_delimiters() {
    let config = TokenizerConfiguration::default();
    let tokens = tokenize("2024-01-15", &config);
    assert_eq!(texts(&tokens), vec!["2024", "-", "01", "-", "15"]);
}

#[test]
fn thousands_separator_before_decimal_only() {
    let config = TokenizerConfiguration::default();
    assert_eq!(texts(&tokenize("1,000.25", &config)), vec!["1,000.25"]);
    assert_eq!(texts(&tokenize("1.2.3", &config)), vec!["1.2", ".", "3"]);
    assert_eq!(texts(&tokenize("7.", &config)), vec!["7", "."]);
}

#[test]
fn adjacent_text_and_number_become_mixed() {
    let config = TokenizerConfiguration::default();
    let tokens = tokenize("abc123 x", &config);
    assert_eq!(texts(&tokens), vec!["abc123", " ", "x"]);
    assert_eq!(
        types(&tokens),
        vec![TokenType::Mixed, TokenType::Whitespace, TokenType::Text]
    );

    let no_mixed = TokenizerConfiguration::builder()
        .enable_mixed_tokens(false)
        .build()
        .unwrap();
    let tokens = tokenize("abc123 x", &no_mixed);
    assert_eq!(texts(&tokens), vec!["abc", "123", " ", "x"]);
}

#[test]
fn mixed_swallows_case_split_text() {
    let config = TokenizerConfiguration::default();
    let tokens = tokenize("Ab12-x", &config);
    assert_eq!(texts(&tokens), vec!["Ab12", "-", "x"]);
    assert_eq!(tokens[0].token_type(), TokenType::Mixed);
}

#[test]
fn whitespace_runs_form_one_token() {
    let config = TokenizerConfiguration::default();
    let tokens = tokenize("a \t b", &config);
    assert_eq!(texts(&tokens), vec!["a", " \t ", "b"]);
    assert_eq!(tokens[1].token_type(), TokenType::Whitespace);
}

#[test]
fn disabled_number_type_reads_digits_as_delimiters() {
    let config = TokenizerConfiguration::builder()
        .enable_token_type(TokenType::Number, false)
        .build()
        .unwrap();
    let tokens = tokenize("ab12", &config);
    assert_eq!(texts(&tokens), vec!["ab", "12"]);
    assert_eq!(types(&tokens), vec![TokenType::Text, TokenType::Delim]);
}

#[test]
fn tokens_cover_the_whole_input() {
    let configs = vec![
        TokenizerConfiguration::default(),
        TokenizerConfiguration::builder()
            .discriminate_text_case(false)
            .enable_mixed_tokens(false)
            .discriminate_negative_numbers(true)
            .build()
            .unwrap(),
        TokenizerConfiguration::builder().builtin_token("EMAIL").build().unwrap(),
    ];
    let inputs = [
        "",
        " ",
        "AB-123",
        "-5",
        "--5",
        "a@b.com, c@d.org",
        "Ünïcödé wörds 42",
        "tab\tsep\r\n",
        "1,234,567.89 EUR",
        "x1y2z3",
        "((--))",
        "日本語 テキスト 12",
    ];
    for config in &configs {
        for input in inputs {
            let tokens = tokenize(input, config);
            let joined: String = tokens.iter().map(|t| t.text()).collect();
            assert_eq!(joined, input);
            assert!(tokens.iter().all(|t| !t.is_empty()));
        }
    }
}

#[test]
fn fractions_and_superscripts_are_not_digits() {
    let config = TokenizerConfiguration::default();
    let tokens = tokenize("x²½3", &config);
    assert_eq!(texts(&tokens), vec!["x", "²½", "3"]);
    assert_eq!(
        types(&tokens),
        vec![TokenType::Text, TokenType::Delim, TokenType::Number]
    );
}
