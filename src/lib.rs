pub mod token;
pub mod config;
pub mod predefined;
pub mod tokenizer;
pub mod symbol;
pub mod pattern;
pub mod annotation;
pub mod finder;
pub mod result;
pub mod reducer;
pub mod analyzer;
pub mod telemetry;

pub use analyzer::{analyze_partitioned, AnalysisOpts, PatternFinderAnalyzer};
pub use annotation::{InMemoryRowAnnotationFactory, InputRow, NoopRowAnnotationFactory, RowAnnotation, RowAnnotationFactory};
pub use config::{ConfigError, PredefinedTokenDefinition, TokenizerConfiguration};
pub use finder::PatternFinder;
pub use pattern::Pattern;
pub use reducer::{reduce, ReduceError};
pub use result::{Crosstab, PatternFinderResult, PatternRow};
pub use token::{Token, TokenType};
pub use tokenizer::tokenize;
