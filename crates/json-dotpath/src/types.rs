//! Type definitions for dotted paths.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

/// Classification of a single path segment.
///
/// Every token keeps its raw text: a map lookup always uses the text as
/// written, so `"03"` and `"3"` are different keys even though both classify
/// as index `3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Plain key. Also covers text with `:` that is not a valid slice.
    Field(String),
    /// Decimal integer, possibly negative.
    Index { raw: String, index: i64 },
    /// `start:end` pair of decimal integers.
    Slice { raw: String, start: i64, end: i64 },
    /// The reserved `append` segment.
    Append,
}

impl Token {
    pub const APPEND: &'static str = "append";

    /// The segment text as it appeared in the path.
    pub fn key(&self) -> &str {
        match self {
            Token::Field(raw) | Token::Index { raw, .. } | Token::Slice { raw, .. } => raw,
            Token::Append => Self::APPEND,
        }
    }

    pub fn is_append(&self) -> bool {
        matches!(self, Token::Append)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A parsed path. Never empty: the empty string parses to one empty field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    pub(crate) tokens: Vec<Token>,
}

impl Path {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The final token and everything before it.
    pub fn split_last(&self) -> Option<(&Token, &[Token])> {
        self.tokens.split_last()
    }
}

impl FromStr for Path {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(crate::parse::parse_path(s))
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::parse::format_path(self))
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Container view of a JSON value: the three shapes traversal dispatches on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<'a> {
    Map(&'a Map<String, Value>),
    Sequence(&'a Vec<Value>),
    Scalar(&'a Value),
}

impl<'a> Node<'a> {
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Node::Map(map),
            Value::Array(arr) => Node::Sequence(arr),
            other => Node::Scalar(other),
        }
    }

    /// Short name used in error messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Map(_) => "map",
            Node::Sequence(_) => "sequence",
            Node::Scalar(_) => "scalar",
        }
    }
}
