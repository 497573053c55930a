//! Dotted-path access for JSON documents.
//!
//! Paths are dot separated segments such as `a.b.0` or, equivalently,
//! `a.b[0]`. A segment is used as a map key, an integer sequence index
//! (negative values count from the end), a `start:end` slice, or the reserved
//! word `append`.
//!
//! - [`get`] never fails: any segment that cannot be resolved yields the
//!   caller's default.
//! - [`set`] creates missing maps and pads sequences as it goes, and reports
//!   the few shapes it cannot write through as a [`PathError`].
//!
//! # Example
//!
//! ```
//! use json_dotpath::{get, get_or_null, set};
//! use serde_json::json;
//!
//! let mut doc = json!({"a": [1, 2, 3]});
//!
//! set(&mut doc, "a.3.b", json!(4)).unwrap();
//! assert_eq!(*get_or_null(&doc, "a[3].b"), json!(4));
//!
//! let fallback = json!("none");
//! assert_eq!(*get(&doc, "a.9.b", &fallback), fallback);
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Node, Path, Token};

mod parse;
pub use parse::{format_path, parse_path};

mod get;
pub use get::{get, get_or_null, get_path};

mod set;
pub use set::{set, set_path};

pub mod cli;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("'append' can only be used on a sequence, not on a {found}")]
    AppendOnNonSequence { found: &'static str },
    #[error("index {index} is out of range for sequence of length {len}")]
    IndexOutOfRange { index: String, len: usize },
    #[error("invalid sequence index: {0:?}")]
    InvalidIndex(String),
    #[error("cannot apply {token:?} to a {found}")]
    NotAContainer { token: String, found: &'static str },
}
