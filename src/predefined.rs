use once_cell::sync::Lazy;
use std::ops::Range;
use std::sync::Arc;

use crate::config::PredefinedTokenDefinition;

/// A piece of the input after predefined tokens have been carved out.
#[derive(Debug, Clone)]
pub enum Span<'a> {
    Predefined {
        definition: Arc<PredefinedTokenDefinition>,
        text: &'a str,
    },
    Undefined(&'a str),
}

impl<'a> Span<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Span::Predefined { text, .. } => text,
            Span::Undefined(text) => text,
        }
    }
}

enum RawSpan {
    Predefined(Range<usize>, Arc<PredefinedTokenDefinition>),
    Undefined(Range<usize>),
}

/// Splits `input` into alternating predefined and undefined spans.
///
/// Definitions are applied in order, and each definition's regexes in order.
/// Every regex scans only the spans nobody has claimed yet, so an earlier
/// definition (or an earlier regex of the same definition) always wins.
pub fn split_predefined<'a>(
    input: &'a str,
    definitions: &[Arc<PredefinedTokenDefinition>],
) -> Vec<Span<'a>> {
    if input.is_empty() {
        return Vec::new();
    }
    let mut spans = vec![RawSpan::Undefined(0..input.len())];
    for definition in definitions {
        for re in definition.patterns() {
            let mut next = Vec::with_capacity(spans.len());
            for span in spans {
                let range = match span {
                    RawSpan::Undefined(range) => range,
                    claimed => {
                        next.push(claimed);
                        continue;
                    }
                };
                let mut cursor = range.start;
                for m in re.find_iter(&input[range.clone()]) {
                    if m.as_str().is_empty() {
                        continue;
                    }
                    let start = range.start + m.start();
                    let end = range.start + m.end();
                    if start > cursor {
                        next.push(RawSpan::Undefined(cursor..start));
                    }
                    next.push(RawSpan::Predefined(start..end, definition.clone()));
                    cursor = end;
                }
                if cursor < range.end {
                    next.push(RawSpan::Undefined(cursor..range.end));
                }
            }
            spans = next;
        }
    }
    spans
        .into_iter()
        .map(|span| match span {
            RawSpan::Predefined(range, definition) => Span::Predefined {
                definition,
                text: &input[range],
            },
            RawSpan::Undefined(range) => Span::Undefined(&input[range]),
        })
        .collect()
}

static BUILTIN_TOKENS: Lazy<Vec<(&'static str, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        ("EMAIL", vec![r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}"]),
        ("URL", vec![r#"\b[a-zA-Z][a-zA-Z0-9+.-]*://[^\s"']+"#]),
        (
            "TIMESTAMP",
            vec![r"\b\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}:\d{2}(?:\.\d{1,9})?(?:Z|[+-](?:\d{2}(?::?\d{2})?|\d{4}))?"],
        ),
        (
            "UUID",
            vec![r"\b[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\b"],
        ),
        ("IPV6", vec![r"\b(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}\b"]),
        (
            "IPV4",
            vec![r"\b(?:(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\.){3}(?:25[0-5]|2[0-4]\d|1\d\d|[1-9]?\d)\b"],
        ),
        ("HEX", vec![r"\b(?:0x)?[0-9a-fA-F]{16,}\b"]),
    ]
});

/// Names accepted by [`builtin_definition`].
pub fn builtin_names() -> Vec<&'static str> {
    BUILTIN_TOKENS.iter().map(|(name, _)| *name).collect()
}

/// Looks up a ready-made definition by (case-insensitive) name.
pub fn builtin_definition(name: &str) -> Option<PredefinedTokenDefinition> {
    let (name, patterns) = BUILTIN_TOKENS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))?;
    // catalog regexes are fixed and covered by tests
    PredefinedTokenDefinition::new(*name, patterns.iter()).ok()
}
