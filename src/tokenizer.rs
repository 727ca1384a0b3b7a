use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::TokenizerConfiguration;
use crate::predefined::{split_predefined, Span};
use crate::token::{Token, TokenType};

/// Splits `value` into a contiguous token sequence covering the whole input.
///
/// Predefined tokens are carved out first; the remaining spans go through the
/// character-class tokenizer. An empty value yields no tokens.
pub fn tokenize(value: &str, config: &TokenizerConfiguration) -> Vec<Token> {
    if value.is_empty() {
        return Vec::new();
    }
    if !config.is_enabled(TokenType::Predefined) || config.predefined_tokens().is_empty() {
        return tokenize_undefined(value, config);
    }
    let mut tokens = Vec::new();
    for span in split_predefined(value, config.predefined_tokens()) {
        match span {
            Span::Predefined { definition, text } => tokens.push(Token::predefined(definition, text)),
            Span::Undefined(text) => tokens.extend(tokenize_undefined(text, config)),
        }
    }
    tokens
}

fn classify(c: char, config: &TokenizerConfiguration) -> TokenType {
    let token_type = if c.is_whitespace() {
        TokenType::Whitespace
    } else if c.is_ascii_digit() {
        TokenType::Number
    } else if c.is_alphabetic() {
        TokenType::Text
    } else {
        TokenType::Delim
    };
    if config.is_enabled(token_type) {
        token_type
    } else {
        TokenType::Delim
    }
}

struct PendingToken {
    token_type: TokenType,
    text: String,
    upper_case: bool,
    has_decimal: bool,
}

impl PendingToken {
    fn new(token_type: TokenType, c: char, config: &TokenizerConfiguration) -> Self {
        let mut pending = Self {
            token_type,
            text: String::new(),
            upper_case: c.is_uppercase(),
            has_decimal: false,
        };
        pending.push(c, config);
        pending
    }

    fn push(&mut self, c: char, config: &TokenizerConfiguration) {
        if self.token_type == TokenType::Number && Some(c) == config.decimal_separator() {
            self.has_decimal = true;
        }
        self.text.push(c);
    }

    fn accepts_separator(&self, c: char, config: &TokenizerConfiguration) -> bool {
        if self.token_type != TokenType::Number || self.has_decimal {
            return false;
        }
        Some(c) == config.decimal_separator() || Some(c) == config.thousands_separator()
    }

    // single-case text tokens when case is discriminated
    fn breaks_case(&self, c: char, config: &TokenizerConfiguration) -> bool {
        self.token_type == TokenType::Text
            && config.discriminate_text_case()
            && c.is_uppercase() != self.upper_case
    }

    fn finish(self) -> Token {
        Token::simple(self.token_type, self.text)
    }
}

/// Returns the class a character takes in context and whether it must open a
/// new token. Separators and the minus sign only belong to a number when a
/// digit follows.
fn resolve_class(
    c: char,
    class: TokenType,
    next_is_digit: bool,
    pending: Option<&PendingToken>,
    config: &TokenizerConfiguration,
) -> (TokenType, bool) {
    if class != TokenType::Delim || !next_is_digit || !config.is_enabled(TokenType::Number) {
        return (class, false);
    }
    match pending {
        Some(p) if p.token_type == TokenType::Number => {
            if p.accepts_separator(c, config) {
                (TokenType::Number, false)
            } else {
                (TokenType::Delim, false)
            }
        }
        Some(p) if p.token_type == TokenType::Text => (TokenType::Delim, false),
        _ if Some(c) == config.minus_sign() => (TokenType::Number, true),
        _ => (TokenType::Delim, false),
    }
}

fn tokenize_undefined(text: &str, config: &TokenizerConfiguration) -> Vec<Token> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut pending: Option<PendingToken> = None;

    for (i, &c) in chars.iter().enumerate() {
        let next_is_digit = chars
            .get(i + 1)
            .map_or(false, |n| classify(*n, config) == TokenType::Number);
        let (token_type, force_new) =
            resolve_class(c, classify(c, config), next_is_digit, pending.as_ref(), config);

        let extend = matches!(
            pending.as_ref(),
            Some(p) if !force_new && p.token_type == token_type && !p.breaks_case(c, config)
        );
        if extend {
            if let Some(p) = pending.as_mut() {
                p.push(c, config);
            }
        } else {
            if let Some(p) = pending.take() {
                tokens.push(p.finish());
            }
            pending = Some(PendingToken::new(token_type, c, config));
        }
    }
    if let Some(p) = pending.take() {
        tokens.push(p.finish());
    }

    if config.is_enabled(TokenType::Mixed) {
        flatten_mixed(tokens)
    } else {
        tokens
    }
}

/// Collapses each run of adjacent text/number tokens holding both kinds into
/// one MIXED token.
fn flatten_mixed(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut run: Vec<Token> = Vec::new();
    for token in tokens {
        match token.token_type() {
            TokenType::Text | TokenType::Number => run.push(token),
            _ => {
                flush_run(&mut run, &mut out);
                out.push(token);
            }
        }
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut Vec<Token>, out: &mut Vec<Token>) {
    let has_text = run.iter().any(|t| t.token_type() == TokenType::Text);
    let has_number = run.iter().any(|t| t.token_type() == TokenType::Number);
    if has_text && has_number {
        let text: String = run.iter().map(|t| t.text()).collect();
        out.push(Token::simple(TokenType::Mixed, text));
        run.clear();
    } else {
        out.append(run);
    }
}

/// LRU memo of value -> tokens. Tokenization depends only on the value and the
/// run's configuration, so a cache must not outlive the configuration it was
/// filled with.
pub struct TokenCache {
    cache: LruCache<String, Arc<[Token]>>,
}

impl TokenCache {
    /// Returns `None` for a zero capacity (caching disabled).
    pub fn new(capacity: usize) -> Option<Self> {
        NonZeroUsize::new(capacity).map(|cap| Self { cache: LruCache::new(cap) })
    }

    pub fn tokenize(&mut self, value: &str, config: &TokenizerConfiguration) -> Arc<[Token]> {
        if let Some(tokens) = self.cache.get(value) {
            return tokens.clone();
        }
        let tokens: Arc<[Token]> = tokenize(value, config).into();
        self.cache.put(value.to_string(), tokens.clone());
        tokens
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
