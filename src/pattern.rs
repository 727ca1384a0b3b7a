use std::fmt;

use crate::config::TokenizerConfiguration;
use crate::symbol::Symbol;
use crate::token::Token;

/// One learned string shape: an ordered list of symbols plus the first value
/// that produced it. The symbolic string is the pattern's identity.
#[derive(Debug, Clone)]
pub struct Pattern {
    symbols: Vec<Symbol>,
    sample: String,
}

impl Pattern {
    pub fn from_tokens(tokens: &[Token], sample: impl Into<String>, config: &TokenizerConfiguration) -> Self {
        Self {
            symbols: tokens.iter().map(|t| Symbol::generalize(t, config)).collect(),
            sample: sample.into(),
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Non-mutating check: same cardinality and every symbol accepts the
    /// token at its position.
    pub fn accepts(&self, tokens: &[Token], config: &TokenizerConfiguration) -> bool {
        self.symbols.len() == tokens.len()
            && self
                .symbols
                .iter()
                .zip(tokens)
                .all(|(symbol, token)| symbol.accepts(token, config))
    }

    /// Matches `tokens` and, on success, widens every expandable symbol that
    /// is shorter than its token.
    pub fn match_tokens(&mut self, tokens: &[Token], config: &TokenizerConfiguration) -> bool {
        if !self.accepts(tokens, config) {
            return false;
        }
        for (symbol, token) in self.symbols.iter_mut().zip(tokens) {
            symbol.widen(token);
        }
        true
    }

    pub fn to_symbolic_string(&self) -> String {
        self.symbols.iter().map(Symbol::to_symbolic_string).collect()
    }

    /// The pattern rendered back into stand-in tokens, for replaying a learned
    /// pattern against other patterns.
    pub fn probe_tokens(&self) -> Vec<Token> {
        self.symbols.iter().map(Symbol::probe_token).collect()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_symbolic_string())
    }
}
