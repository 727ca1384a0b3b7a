use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::predefined;
use crate::token::{TokenType, TokenTypeMap};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("predefined token name must not be empty")]
    EmptyName,
    #[error("predefined token '{0}' has no patterns")]
    NoPatterns(String),
    #[error("invalid pattern for predefined token '{name}': {pattern}")]
    InvalidPattern {
        name: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("unknown built-in token '{0}'")]
    UnknownBuiltin(String),
    #[error("decimal separator and thousands separator are both '{0}'")]
    SeparatorConflict(char),
    #[error("token type {0} cannot be disabled")]
    RequiredTokenType(TokenType),
    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A named token recognized by user supplied regexes, tried in order.
#[derive(Debug, Clone)]
pub struct PredefinedTokenDefinition {
    name: String,
    patterns: Vec<Regex>,
}

impl PredefinedTokenDefinition {
    pub fn new<I, S>(name: impl Into<String>, patterns: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyName);
        }
        let mut compiled: Vec<Regex> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if compiled.iter().any(|r| r.as_str() == pattern) {
                continue;
            }
            let re = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                name: name.clone(),
                pattern: pattern.to_string(),
                source,
            })?;
            compiled.push(re);
        }
        if compiled.is_empty() {
            return Err(ConfigError::NoPatterns(name));
        }
        Ok(Self { name, patterns: compiled })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Symbolic rendering used for every token of this definition, e.g. `[EMAIL]`.
    pub fn bracketed_name(&self) -> String {
        format!("[{}]", self.name)
    }

    fn same_as(&self, other: &PredefinedTokenDefinition) -> bool {
        self.name == other.name
            && self.patterns.len() == other.patterns.len()
            && self
                .patterns
                .iter()
                .zip(other.patterns.iter())
                .all(|(a, b)| a.as_str() == b.as_str())
    }
}

/// Tokenization and generalization settings for one run. Every pattern of a
/// run is built and matched against the same instance, so it is shared behind
/// an `Arc` and never mutated once built.
#[derive(Debug, Clone)]
pub struct TokenizerConfiguration {
    enabled: TokenTypeMap<bool>,
    length_discrimination: TokenTypeMap<bool>,
    discriminate_text_case: bool,
    discriminate_whitespace: bool,
    discriminate_decimals: bool,
    discriminate_negative_numbers: bool,
    upper_case_expandable: bool,
    lower_case_expandable: bool,
    decimal_separator: Option<char>,
    thousands_separator: Option<char>,
    minus_sign: Option<char>,
    predefined_tokens: Vec<Arc<PredefinedTokenDefinition>>,
}

impl Default for TokenizerConfiguration {
    fn default() -> Self {
        Self {
            enabled: TokenTypeMap::from_fn(|_| true),
            length_discrimination: TokenTypeMap::from_fn(|t| {
                matches!(t, TokenType::Delim | TokenType::Whitespace)
            }),
            discriminate_text_case: true,
            discriminate_whitespace: true,
            discriminate_decimals: true,
            discriminate_negative_numbers: false,
            upper_case_expandable: false,
            lower_case_expandable: true,
            decimal_separator: Some('.'),
            thousands_separator: Some(','),
            minus_sign: Some('-'),
            predefined_tokens: Vec::new(),
        }
    }
}

impl PartialEq for TokenizerConfiguration {
    fn eq(&self, other: &Self) -> bool {
        self.enabled == other.enabled
            && self.length_discrimination == other.length_discrimination
            && self.discriminate_text_case == other.discriminate_text_case
            && self.discriminate_whitespace == other.discriminate_whitespace
            && self.discriminate_decimals == other.discriminate_decimals
            && self.discriminate_negative_numbers == other.discriminate_negative_numbers
            && self.upper_case_expandable == other.upper_case_expandable
            && self.lower_case_expandable == other.lower_case_expandable
            && self.decimal_separator == other.decimal_separator
            && self.thousands_separator == other.thousands_separator
            && self.minus_sign == other.minus_sign
            && self.predefined_tokens.len() == other.predefined_tokens.len()
            && self
                .predefined_tokens
                .iter()
                .zip(other.predefined_tokens.iter())
                .all(|(a, b)| a.same_as(b))
    }
}

impl TokenizerConfiguration {
    pub fn builder() -> TokenizerConfigurationBuilder {
        TokenizerConfigurationBuilder::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = serde_json::from_str(json)?;
        file.apply(Self::builder())?.build()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn is_enabled(&self, token_type: TokenType) -> bool {
        self.enabled.get(token_type)
    }

    pub fn discriminates_length(&self, token_type: TokenType) -> bool {
        self.length_discrimination.get(token_type)
    }

    pub fn discriminate_text_case(&self) -> bool {
        self.discriminate_text_case
    }

    pub fn discriminate_whitespace(&self) -> bool {
        self.discriminate_whitespace
    }

    pub fn discriminate_decimals(&self) -> bool {
        self.discriminate_decimals
    }

    pub fn discriminate_negative_numbers(&self) -> bool {
        self.discriminate_negative_numbers
    }

    pub fn upper_case_expandable(&self) -> bool {
        self.upper_case_expandable
    }

    pub fn lower_case_expandable(&self) -> bool {
        self.lower_case_expandable
    }

    /// Whether text symbols of the given case may grow in length.
    pub fn case_expandable(&self, upper_case: bool) -> bool {
        if upper_case {
            self.upper_case_expandable
        } else {
            self.lower_case_expandable
        }
    }

    pub fn decimal_separator(&self) -> Option<char> {
        self.decimal_separator
    }

    pub fn thousands_separator(&self) -> Option<char> {
        self.thousands_separator
    }

    pub fn minus_sign(&self) -> Option<char> {
        self.minus_sign
    }

    pub fn predefined_tokens(&self) -> &[Arc<PredefinedTokenDefinition>] {
        &self.predefined_tokens
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenizerConfigurationBuilder {
    config: TokenizerConfiguration,
    pending_tokens: Vec<(String, Vec<String>)>,
    builtin_tokens: Vec<String>,
}

impl TokenizerConfigurationBuilder {
    pub fn enable_token_type(mut self, token_type: TokenType, enabled: bool) -> Self {
        self.config.enabled.set(token_type, enabled);
        self
    }

    pub fn enable_mixed_tokens(self, enabled: bool) -> Self {
        self.enable_token_type(TokenType::Mixed, enabled)
    }

    pub fn discriminate_length(mut self, token_type: TokenType, enabled: bool) -> Self {
        self.config.length_discrimination.set(token_type, enabled);
        self
    }

    pub fn discriminate_text_case(mut self, enabled: bool) -> Self {
        self.config.discriminate_text_case = enabled;
        self
    }

    pub fn discriminate_whitespace(mut self, enabled: bool) -> Self {
        self.config.discriminate_whitespace = enabled;
        self
    }

    /// Treat any run of whitespace as the same symbol regardless of its
    /// characters or length.
    pub fn ignore_repeated_spaces(mut self, ignore: bool) -> Self {
        self.config.length_discrimination.set(TokenType::Whitespace, !ignore);
        self.config.discriminate_whitespace = !ignore;
        self
    }

    pub fn discriminate_decimals(mut self, enabled: bool) -> Self {
        self.config.discriminate_decimals = enabled;
        self
    }

    pub fn discriminate_negative_numbers(mut self, enabled: bool) -> Self {
        self.config.discriminate_negative_numbers = enabled;
        self
    }

    pub fn upper_case_expandable(mut self, enabled: bool) -> Self {
        self.config.upper_case_expandable = enabled;
        self
    }

    pub fn lower_case_expandable(mut self, enabled: bool) -> Self {
        self.config.lower_case_expandable = enabled;
        self
    }

    pub fn decimal_separator(mut self, separator: Option<char>) -> Self {
        self.config.decimal_separator = separator;
        self
    }

    pub fn thousands_separator(mut self, separator: Option<char>) -> Self {
        self.config.thousands_separator = separator;
        self
    }

    pub fn minus_sign(mut self, sign: Option<char>) -> Self {
        self.config.minus_sign = sign;
        self
    }

    pub fn predefined_token<I, S>(mut self, name: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending_tokens
            .push((name.into(), patterns.into_iter().map(Into::into).collect()));
        self
    }

    /// Add one of the definitions from the built-in catalog (`EMAIL`, `URL`, ...).
    pub fn builtin_token(mut self, name: impl Into<String>) -> Self {
        self.builtin_tokens.push(name.into());
        self
    }

    pub fn build(self) -> Result<TokenizerConfiguration, ConfigError> {
        let mut config = self.config;
        if !config.enabled.get(TokenType::Delim) {
            return Err(ConfigError::RequiredTokenType(TokenType::Delim));
        }
        if let (Some(d), Some(t)) = (config.decimal_separator, config.thousands_separator) {
            if d == t {
                return Err(ConfigError::SeparatorConflict(d));
            }
        }
        for name in self.builtin_tokens {
            let def = predefined::builtin_definition(&name)
                .ok_or_else(|| ConfigError::UnknownBuiltin(name.clone()))?;
            config.predefined_tokens.push(Arc::new(def));
        }
        for (name, patterns) in self.pending_tokens {
            let def = PredefinedTokenDefinition::new(name, patterns)?;
            config.predefined_tokens.push(Arc::new(def));
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredefinedTokenSpec {
    pub name: String,
    pub patterns: Vec<String>,
}

/// On-disk (JSON) form of a configuration. Absent fields keep the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub discriminate_text_case: Option<bool>,
    pub discriminate_whitespace: Option<bool>,
    pub discriminate_decimals: Option<bool>,
    pub discriminate_negative_numbers: Option<bool>,
    pub enable_mixed_tokens: Option<bool>,
    pub ignore_repeated_spaces: Option<bool>,
    pub upper_case_expandable: Option<bool>,
    pub lower_case_expandable: Option<bool>,
    pub decimal_separator: Option<char>,
    pub thousands_separator: Option<char>,
    pub minus_sign: Option<char>,
    pub disabled_token_types: Vec<TokenType>,
    /// When present, replaces the default set of length-discriminated types.
    pub length_discriminated: Option<Vec<TokenType>>,
    pub predefined_tokens: Vec<PredefinedTokenSpec>,
    pub builtin_tokens: Vec<String>,
}

impl ConfigFile {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn apply(
        self,
        mut builder: TokenizerConfigurationBuilder,
    ) -> Result<TokenizerConfigurationBuilder, ConfigError> {
        if let Some(v) = self.discriminate_text_case { builder = builder.discriminate_text_case(v); }
        if let Some(v) = self.discriminate_whitespace { builder = builder.discriminate_whitespace(v); }
        if let Some(v) = self.discriminate_decimals { builder = builder.discriminate_decimals(v); }
        if let Some(v) = self.discriminate_negative_numbers { builder = builder.discriminate_negative_numbers(v); }
        if let Some(v) = self.enable_mixed_tokens { builder = builder.enable_mixed_tokens(v); }
        if let Some(v) = self.ignore_repeated_spaces { builder = builder.ignore_repeated_spaces(v); }
        if let Some(v) = self.upper_case_expandable { builder = builder.upper_case_expandable(v); }
        if let Some(v) = self.lower_case_expandable { builder = builder.lower_case_expandable(v); }
        if let Some(c) = self.decimal_separator { builder = builder.decimal_separator(Some(c)); }
        if let Some(c) = self.thousands_separator { builder = builder.thousands_separator(Some(c)); }
        if let Some(c) = self.minus_sign { builder = builder.minus_sign(Some(c)); }
        for t in self.disabled_token_types {
            if t == TokenType::Delim {
                return Err(ConfigError::RequiredTokenType(t));
            }
            builder = builder.enable_token_type(t, false);
        }
        if let Some(types) = self.length_discriminated {
            for t in TokenType::ALL {
                builder = builder.discriminate_length(t, types.contains(&t));
            }
        }
        for name in self.builtin_tokens {
            builder = builder.builtin_token(name);
        }
        for spec in self.predefined_tokens {
            builder = builder.predefined_token(spec.name, spec.patterns);
        }
        Ok(builder)
    }
}
