use std::sync::Arc;

use crate::config::{PredefinedTokenDefinition, TokenizerConfiguration};
use crate::token::{Token, TokenType};

/// Generalized shape of one token position within a pattern.
#[derive(Debug, Clone)]
pub struct Symbol {
    token_type: TokenType,
    length: usize,
    upper_case_only: bool,
    lower_case_only: bool,
    negative_sign: Option<char>,
    decimal_separator: Option<char>,
    fraction_len: usize,
    literal: Option<String>,
    definition: Option<Arc<PredefinedTokenDefinition>>,
}

fn fraction_len(text: &str, separator: char) -> Option<usize> {
    text.rfind(separator)
        .map(|i| text[i + separator.len_utf8()..].chars().count())
}

fn starts_upper_case(token: &Token) -> bool {
    token.first_char().map_or(false, char::is_uppercase)
}

impl Symbol {
    pub fn generalize(token: &Token, config: &TokenizerConfiguration) -> Self {
        let mut symbol = Self {
            token_type: token.token_type(),
            length: token.len(),
            upper_case_only: false,
            lower_case_only: false,
            negative_sign: None,
            decimal_separator: None,
            fraction_len: 0,
            literal: None,
            definition: None,
        };
        match symbol.token_type {
            TokenType::Text => {
                if config.discriminate_text_case() {
                    let upper = starts_upper_case(token);
                    symbol.upper_case_only = upper;
                    symbol.lower_case_only = !upper;
                }
            }
            TokenType::Number => {
                if config.discriminate_decimals() {
                    if let Some(sep) = config.decimal_separator() {
                        if let Some(frac) = fraction_len(token.text(), sep) {
                            symbol.decimal_separator = Some(sep);
                            symbol.fraction_len = frac;
                        }
                    }
                }
                if config.discriminate_negative_numbers() {
                    if let Some(sign) = config.minus_sign() {
                        if token.first_char() == Some(sign) {
                            symbol.negative_sign = Some(sign);
                        }
                    }
                }
            }
            TokenType::Delim => symbol.literal = Some(token.text().to_string()),
            TokenType::Whitespace => {
                if config.discriminate_whitespace() {
                    symbol.literal = Some(token.text().to_string());
                }
            }
            TokenType::Predefined => match token.predefined_definition() {
                Some(def) => {
                    symbol.literal = Some(def.bracketed_name());
                    symbol.definition = Some(def.clone());
                }
                None => symbol.literal = Some(token.text().to_string()),
            },
            TokenType::Mixed => {}
        }
        symbol
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_upper_case_only(&self) -> bool {
        self.upper_case_only
    }

    pub fn is_lower_case_only(&self) -> bool {
        self.lower_case_only
    }

    pub fn is_negative(&self) -> bool {
        self.negative_sign.is_some()
    }

    pub fn is_decimal(&self) -> bool {
        self.decimal_separator.is_some()
    }

    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    pub fn is_expandable(&self) -> bool {
        self.literal.is_none()
    }

    /// Whether `token` fits this position. Mirrors the discrimination applied
    /// by [`Symbol::generalize`].
    pub fn accepts(&self, token: &Token, config: &TokenizerConfiguration) -> bool {
        if self.token_type != token.token_type() {
            return false;
        }
        if config.discriminates_length(self.token_type) && self.length != token.len() {
            return false;
        }
        match self.token_type {
            TokenType::Text => self.accepts_text(token, config),
            TokenType::Number => self.accepts_number(token, config),
            TokenType::Delim | TokenType::Whitespace => {
                self.literal.as_deref().map_or(true, |l| l == token.text())
            }
            TokenType::Predefined => match (&self.definition, token.predefined_definition()) {
                (Some(mine), Some(theirs)) => mine.name() == theirs.name(),
                _ => self.literal.as_deref() == Some(token.text()),
            },
            TokenType::Mixed => true,
        }
    }

    fn accepts_text(&self, token: &Token, config: &TokenizerConfiguration) -> bool {
        if !config.discriminate_text_case() {
            return true;
        }
        // text tokens are single-case here, the first char stands for all
        let upper = starts_upper_case(token);
        if upper != self.upper_case_only {
            return false;
        }
        if !config.case_expandable(upper) {
            return token.len() == self.length;
        }
        true
    }

    fn accepts_number(&self, token: &Token, config: &TokenizerConfiguration) -> bool {
        if config.discriminate_negative_numbers() {
            if let Some(sign) = config.minus_sign() {
                if self.is_negative() != (token.first_char() == Some(sign)) {
                    return false;
                }
            }
        }
        if config.discriminate_decimals() {
            if let Some(sep) = config.decimal_separator() {
                if self.is_decimal() != token.text().contains(sep) {
                    return false;
                }
            }
        }
        true
    }

    /// Grows an expandable symbol to fit an accepted token. Never shrinks.
    pub(crate) fn widen(&mut self, token: &Token) {
        if !self.is_expandable() {
            return;
        }
        if token.len() > self.length {
            self.length = token.len();
        }
        if let Some(sep) = self.decimal_separator {
            if let Some(frac) = fraction_len(token.text(), sep) {
                self.fraction_len = self.fraction_len.max(frac);
            }
        }
    }

    pub fn to_symbolic_string(&self) -> String {
        if let Some(literal) = &self.literal {
            return literal.clone();
        }
        let fill = match self.token_type {
            TokenType::Text if self.upper_case_only => 'A',
            TokenType::Text => 'a',
            TokenType::Number => '#',
            TokenType::Whitespace => ' ',
            TokenType::Mixed => '?',
            // always rendered from their literal
            TokenType::Delim | TokenType::Predefined => '?',
        };
        let mut chars = vec![fill; self.length];
        if let Some(sign) = self.negative_sign {
            if let Some(first) = chars.first_mut() {
                *first = sign;
            }
        }
        if let Some(sep) = self.decimal_separator {
            let lowest = usize::from(self.negative_sign.is_some());
            if let Some(pos) = self.length.checked_sub(self.fraction_len + 1) {
                if pos >= lowest {
                    chars[pos] = sep;
                }
            }
        }
        chars.into_iter().collect()
    }

    /// Stand-in token carrying this symbol's rendering and length, so a whole
    /// pattern can be fed back through matching.
    pub(crate) fn probe_token(&self) -> Token {
        let text = self.to_symbolic_string();
        let token = match &self.definition {
            Some(def) => Token::predefined(def.clone(), text),
            None => Token::simple(self.token_type, text),
        };
        token.with_length(self.length)
    }
}
