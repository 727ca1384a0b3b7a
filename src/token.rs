use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::PredefinedTokenDefinition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Text,
    Number,
    Delim,
    Whitespace,
    Mixed,
    Predefined,
}

impl TokenType {
    pub const ALL: [TokenType; 6] = [
        TokenType::Text,
        TokenType::Number,
        TokenType::Delim,
        TokenType::Whitespace,
        TokenType::Mixed,
        TokenType::Predefined,
    ];

    fn index(self) -> usize {
        match self {
            TokenType::Text => 0,
            TokenType::Number => 1,
            TokenType::Delim => 2,
            TokenType::Whitespace => 3,
            TokenType::Mixed => 4,
            TokenType::Predefined => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TokenType::Text => "TEXT",
            TokenType::Number => "NUMBER",
            TokenType::Delim => "DELIM",
            TokenType::Whitespace => "WHITESPACE",
            TokenType::Mixed => "MIXED",
            TokenType::Predefined => "PREDEFINED",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed-size map with one slot per [`TokenType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenTypeMap<T> {
    values: [T; 6],
}

impl<T: Copy> TokenTypeMap<T> {
    pub fn from_fn(f: impl Fn(TokenType) -> T) -> Self {
        Self {
            values: TokenType::ALL.map(f),
        }
    }

    pub fn get(&self, token_type: TokenType) -> T {
        self.values[token_type.index()]
    }

    pub fn set(&mut self, token_type: TokenType, value: T) {
        self.values[token_type.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenType, T)> + '_ {
        TokenType::ALL.iter().map(move |t| (*t, self.get(*t)))
    }
}

#[derive(Debug, Clone)]
pub enum TokenKind {
    Simple(TokenType),
    Predefined(Arc<PredefinedTokenDefinition>),
}

/// A typed slice of an input value. Immutable once built by the tokenizer.
#[derive(Debug, Clone)]
pub struct Token {
    kind: TokenKind,
    text: String,
    length: usize,
}

impl Token {
    pub fn simple(token_type: TokenType, text: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self { kind: TokenKind::Simple(token_type), text, length }
    }

    pub fn predefined(definition: Arc<PredefinedTokenDefinition>, text: impl Into<String>) -> Self {
        let text = text.into();
        let length = text.chars().count();
        Self { kind: TokenKind::Predefined(definition), text, length }
    }

    /// Token whose recorded length differs from its text, used when a
    /// pattern is replayed as a stand-in token sequence.
    pub(crate) fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn token_type(&self) -> TokenType {
        match &self.kind {
            TokenKind::Simple(t) => *t,
            TokenKind::Predefined(_) => TokenType::Predefined,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn first_char(&self) -> Option<char> {
        self.text.chars().next()
    }

    pub fn predefined_definition(&self) -> Option<&Arc<PredefinedTokenDefinition>> {
        match &self.kind {
            TokenKind::Predefined(def) => Some(def),
            TokenKind::Simple(_) => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.token_type(), self.text)
    }
}
