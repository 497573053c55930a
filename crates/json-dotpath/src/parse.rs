use std::ops::Range;

use crate::types::{Path, Token};

/// Parse a dotted/bracketed path into tokens.
///
/// Every `[` becomes `.`, every `]` is dropped, and the result is split on
/// `.`. Parsing never fails; an empty path or repeated delimiters produce
/// empty field tokens, which simply fail to resolve later.
///
/// # Example
///
/// ```
/// use json_dotpath::{parse_path, Token};
///
/// let path = parse_path("a[2].b");
/// assert_eq!(path.tokens()[1], Token::Index { raw: "2".to_string(), index: 2 });
/// assert_eq!(path, parse_path("a.2.b"));
/// ```
pub fn parse_path(path: &str) -> Path {
    let normalized = path.replace('[', ".").replace(']', "");
    let tokens = normalized.split('.').map(classify).collect();
    Path { tokens }
}

/// Format a path back into its canonical dotted form.
///
/// Bracket notation does not survive a round trip: `a[0]` formats as `a.0`.
pub fn format_path(path: &Path) -> String {
    let mut out = String::new();
    for (i, token) in path.tokens().iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        out.push_str(token.key());
    }
    out
}

/// Classify one raw segment.
pub(crate) fn classify(segment: &str) -> Token {
    if segment == Token::APPEND {
        return Token::Append;
    }
    if segment.contains(':') {
        return match parse_slice(segment) {
            Some((start, end)) => Token::Slice {
                raw: segment.to_string(),
                start,
                end,
            },
            None => Token::Field(segment.to_string()),
        };
    }
    match segment.parse::<i64>() {
        Ok(index) => Token::Index {
            raw: segment.to_string(),
            index,
        },
        Err(_) => Token::Field(segment.to_string()),
    }
}

fn parse_slice(segment: &str) -> Option<(i64, i64)> {
    let mut parts = segment.split(':');
    let start = parts.next()?.parse().ok()?;
    let end = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((start, end))
}

/// Resolve a possibly negative index against a sequence length.
///
/// Negative indices count from the end. Returns `None` when the position is
/// outside `0..len`.
pub(crate) fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index + len } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// Resolve slice bounds against a sequence length.
///
/// Negative bounds count from the end, both bounds are clamped to `0..=len`,
/// and an inverted pair yields an empty range. Never fails.
pub(crate) fn resolve_slice(len: usize, start: i64, end: i64) -> Range<usize> {
    let clamp = |bound: i64| -> usize {
        let len_i = i64::try_from(len).unwrap_or(i64::MAX);
        let bound = if bound < 0 {
            bound.saturating_add(len_i)
        } else {
            bound
        };
        usize::try_from(bound.clamp(0, len_i)).unwrap_or(len)
    };
    let start = clamp(start);
    let end = clamp(end);
    if start >= end {
        start..start
    } else {
        start..end
    }
}
