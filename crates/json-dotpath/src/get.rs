use std::borrow::Cow;

use serde_json::Value;
use tracing::trace;

use crate::parse::{parse_path, resolve_index, resolve_slice};
use crate::types::{Node, Path, Token};

/// Read the value at `path`, substituting `default` for any step that fails.
///
/// A failing step does not stop the walk: `default` becomes the current value
/// and the remaining tokens are applied to it. A scalar default therefore
/// fails again on every later step and comes back unchanged, while a map or
/// sequence default is traversed like any other node.
///
/// Slices produce a new sequence, which is why the result is a [`Cow`].
///
/// # Example
///
/// ```
/// use json_dotpath::get;
/// use serde_json::json;
///
/// let doc = json!({"a": [1, 2, 3, 4, 5]});
/// assert_eq!(*get(&doc, "a.1:4", &json!(null)), json!([2, 3, 4]));
/// assert_eq!(*get(&doc, "x.y.z", &json!("fallback")), json!("fallback"));
/// ```
pub fn get<'a>(root: &'a Value, path: &str, default: &'a Value) -> Cow<'a, Value> {
    get_path(root, &parse_path(path), default)
}

/// [`get`] with `null` as the default.
pub fn get_or_null<'a>(root: &'a Value, path: &str) -> Cow<'a, Value> {
    static NULL: Value = Value::Null;
    get(root, path, &NULL)
}

/// [`get`] for an already parsed path.
pub fn get_path<'a>(root: &'a Value, path: &Path, default: &'a Value) -> Cow<'a, Value> {
    path.tokens()
        .iter()
        .fold(Cow::Borrowed(root), |current, token| {
            step(current, token).unwrap_or_else(|| {
                trace!(token = %token, "step failed, continuing with default");
                Cow::Borrowed(default)
            })
        })
}

fn step<'a>(current: Cow<'a, Value>, token: &Token) -> Option<Cow<'a, Value>> {
    match current {
        Cow::Borrowed(value) => lookup(value, token),
        Cow::Owned(value) => lookup(&value, token).map(|found| Cow::Owned(found.into_owned())),
    }
}

fn lookup<'v>(value: &'v Value, token: &Token) -> Option<Cow<'v, Value>> {
    match Node::of(value) {
        Node::Map(map) => map.get(token.key()).map(Cow::Borrowed),
        Node::Sequence(arr) => match token {
            Token::Index { index, .. } => {
                let idx = resolve_index(arr.len(), *index)?;
                Some(Cow::Borrowed(&arr[idx]))
            }
            Token::Slice { start, end, .. } => {
                let range = resolve_slice(arr.len(), *start, *end);
                Some(Cow::Owned(Value::Array(arr[range].to_vec())))
            }
            Token::Field(_) | Token::Append => None,
        },
        Node::Scalar(_) => None,
    }
}
