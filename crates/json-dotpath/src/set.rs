use std::ops::Range;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::parse::{parse_path, resolve_index, resolve_slice};
use crate::types::{Path, Token};
use crate::PathError;

/// Write `value` at `path`, creating missing containers along the way.
///
/// Missing map keys are filled with empty maps. Sequences are padded with
/// empty maps up to the requested index. A slice segment `start:end` pads the
/// sequence until `end` is a valid position (an empty sequence goes at `end`
/// itself) and then continues in a copy of `start..=end`. Note the copy is
/// inclusive of `end`, unlike slices on read. Containers inside the copy are
/// the root's own, so `a.0:1.0.k` writes into `a[0]`, but appending to the
/// copy or replacing one of its elements leaves `a` untouched.
///
/// `append` adds `value` to the end of the current sequence. This happens
/// eagerly even when `append` is not the last segment, so `a.append.0`
/// appends `value` to `a` and then assigns `value` again at index `0`.
///
/// # Errors
///
/// - [`PathError::AppendOnNonSequence`] - `append` used on a map
/// - [`PathError::IndexOutOfRange`] - the final index is past the end by more than one,
///   the final segment is a slice, or padding would not fit in memory
/// - [`PathError::InvalidIndex`] - a non-integer segment used on a sequence
/// - [`PathError::NotAContainer`] - a segment applied to a scalar
///
/// # Example
///
/// ```
/// use json_dotpath::set;
/// use serde_json::json;
///
/// let mut doc = json!({});
/// set(&mut doc, "x.y.z", json!("v")).unwrap();
/// assert_eq!(doc, json!({"x": {"y": {"z": "v"}}}));
///
/// let mut doc = json!({"a": [1, 2, 3]});
/// set(&mut doc, "a.append", json!(4)).unwrap();
/// assert_eq!(doc, json!({"a": [1, 2, 3, 4]}));
/// ```
pub fn set(root: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    set_path(root, &parse_path(path), value)
}

/// [`set`] for an already parsed path.
pub fn set_path(root: &mut Value, path: &Path, value: Value) -> Result<(), PathError> {
    let Some((last, prefix)) = path.split_last() else {
        return Ok(());
    };
    write(root, prefix, last, value)
}

fn write(root: &mut Value, prefix: &[Token], last: &Token, value: Value) -> Result<(), PathError> {
    let mut cursor = Cursor::from(root);
    for (i, token) in prefix.iter().enumerate() {
        cursor = match cursor.descend(token, &value)? {
            Step::Live(next) => next,
            Step::Detached(mut copy) => {
                // Nothing below a copied slice element reaches the root, but
                // the rest of the path still has to be valid.
                trace!(token = %token, "continuing inside a slice copy");
                return write(&mut copy, &prefix[i + 1..], last, value);
            }
        };
    }
    cursor.assign(last, value)
}

/// Mutable position reached while walking a path.
enum Cursor<'a> {
    Map(&'a mut Map<String, Value>),
    Seq(&'a mut Vec<Value>),
    Slice(SliceCopy<'a>),
    Scalar(&'static str),
}

/// Outcome of one step: a position inside the root, or an element that only
/// exists in a slice copy.
enum Step<'a> {
    Live(Cursor<'a>),
    Detached(Value),
}

impl<'a> From<&'a mut Value> for Cursor<'a> {
    fn from(value: &'a mut Value) -> Self {
        match value {
            Value::Object(map) => Cursor::Map(map),
            Value::Array(items) => Cursor::Seq(items),
            other => Cursor::Scalar(scalar_name(other)),
        }
    }
}

impl<'a> Cursor<'a> {
    fn descend(self, token: &Token, value: &Value) -> Result<Step<'a>, PathError> {
        match self {
            Cursor::Map(_) if token.is_append() => {
                Err(PathError::AppendOnNonSequence { found: "map" })
            }
            Cursor::Map(map) => {
                let child = map.entry(token.key()).or_insert_with(|| {
                    trace!(key = token.key(), "creating empty map");
                    Value::Object(Map::new())
                });
                Ok(Step::Live(Cursor::from(child)))
            }
            Cursor::Seq(items) => match token {
                Token::Append => {
                    debug!("append in the middle of a path");
                    items.push(value.clone());
                    Ok(Step::Live(Cursor::Seq(items)))
                }
                Token::Slice { raw, start, end } => {
                    pad_for_slice(items, 0, *end, raw)?;
                    let range = resolve_slice(items.len(), *start, end.saturating_add(1));
                    Ok(Step::Live(Cursor::Slice(SliceCopy {
                        shared: &mut items[range],
                        extra: Vec::new(),
                    })))
                }
                Token::Index { raw, index } => {
                    pad_for_index(items, 0, *index, raw)?;
                    let idx = resolve_index(items.len(), *index).ok_or_else(|| {
                        PathError::IndexOutOfRange {
                            index: raw.clone(),
                            len: items.len(),
                        }
                    })?;
                    Ok(Step::Live(Cursor::from(&mut items[idx])))
                }
                Token::Field(raw) => Err(PathError::InvalidIndex(raw.clone())),
            },
            Cursor::Slice(mut copy) => match token {
                Token::Append => {
                    debug!("append to a slice copy");
                    copy.extra.push(value.clone());
                    Ok(Step::Live(Cursor::Slice(copy)))
                }
                Token::Slice { raw, start, end } => {
                    let offset = copy.shared.len();
                    pad_for_slice(&mut copy.extra, offset, *end, raw)?;
                    let range = resolve_slice(copy.len(), *start, end.saturating_add(1));
                    Ok(Step::Live(Cursor::Slice(copy.narrow(range))))
                }
                Token::Index { raw, index } => {
                    let offset = copy.shared.len();
                    pad_for_index(&mut copy.extra, offset, *index, raw)?;
                    let idx = resolve_index(copy.len(), *index).ok_or_else(|| {
                        PathError::IndexOutOfRange {
                            index: raw.clone(),
                            len: copy.len(),
                        }
                    })?;
                    Ok(copy.into_element(idx))
                }
                Token::Field(raw) => Err(PathError::InvalidIndex(raw.clone())),
            },
            Cursor::Scalar(found) => Err(PathError::NotAContainer {
                token: token.key().to_string(),
                found,
            }),
        }
    }

    fn assign(self, last: &Token, value: Value) -> Result<(), PathError> {
        match self {
            Cursor::Map(_) if last.is_append() => {
                Err(PathError::AppendOnNonSequence { found: "map" })
            }
            Cursor::Map(map) => {
                map.insert(last.key().to_string(), value);
                Ok(())
            }
            Cursor::Seq(items) => {
                match final_slot(items.len(), last)? {
                    Slot::At(idx) => items[idx] = value,
                    Slot::End => items.push(value),
                }
                Ok(())
            }
            Cursor::Slice(copy) => {
                final_slot(copy.len(), last)?;
                debug!(token = %last, "write lands in a slice copy");
                Ok(())
            }
            Cursor::Scalar(found) => Err(PathError::NotAContainer {
                token: last.key().to_string(),
                found,
            }),
        }
    }
}

/// A slice taken while writing: behaves like a copy of `start..=end`.
///
/// Elements present before the slice was taken are shared with the root, so
/// writes into them land. Anything the copy gains afterwards lives in `extra`
/// and is dropped with it, as are overwrites of the copy's own slots.
struct SliceCopy<'a> {
    shared: &'a mut [Value],
    extra: Vec<Value>,
}

impl<'a> SliceCopy<'a> {
    fn len(&self) -> usize {
        self.shared.len() + self.extra.len()
    }

    fn narrow(self, range: Range<usize>) -> SliceCopy<'a> {
        let SliceCopy { shared, mut extra } = self;
        let split = shared.len();
        let extra = extra
            .drain(range.start.saturating_sub(split)..range.end.saturating_sub(split))
            .collect();
        SliceCopy {
            shared: &mut shared[range.start.min(split)..range.end.min(split)],
            extra,
        }
    }

    fn into_element(self, idx: usize) -> Step<'a> {
        let SliceCopy { shared, mut extra } = self;
        let split = shared.len();
        if idx < split {
            Step::Live(Cursor::from(&mut shared[idx]))
        } else {
            Step::Detached(extra.swap_remove(idx - split))
        }
    }
}

/// Where the final token writes in a sequence of length `len`.
enum Slot {
    At(usize),
    End,
}

fn final_slot(len: usize, last: &Token) -> Result<Slot, PathError> {
    match last {
        Token::Append => Ok(Slot::End),
        Token::Index { raw, index } => {
            if let Some(idx) = resolve_index(len, *index) {
                Ok(Slot::At(idx))
            } else if usize::try_from(*index) == Ok(len) {
                Ok(Slot::End)
            } else {
                Err(PathError::IndexOutOfRange {
                    index: raw.clone(),
                    len,
                })
            }
        }
        Token::Slice { raw, .. } => Err(PathError::IndexOutOfRange {
            index: raw.clone(),
            len,
        }),
        Token::Field(raw) => Err(PathError::InvalidIndex(raw.clone())),
    }
}

/// Pad with empty maps so that `index` is a valid position. Negative indices
/// never pad. `offset` counts elements that precede `items`.
fn pad_for_index(
    items: &mut Vec<Value>,
    offset: usize,
    index: i64,
    raw: &str,
) -> Result<(), PathError> {
    if index < 0 {
        return Ok(());
    }
    grow(items, offset, index, raw, |_| Value::Object(Map::new()))
}

/// Pad so that `end` is a valid position. The element created at `end` is an
/// empty sequence, every other one an empty map.
fn pad_for_slice(
    items: &mut Vec<Value>,
    offset: usize,
    end: i64,
    raw: &str,
) -> Result<(), PathError> {
    if end < 0 {
        return Ok(());
    }
    grow(items, offset, end, raw, |pos| {
        if i64::try_from(pos) == Ok(end) {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        }
    })
}

fn grow(
    items: &mut Vec<Value>,
    offset: usize,
    last_pos: i64,
    raw: &str,
    fill: impl Fn(usize) -> Value,
) -> Result<(), PathError> {
    let current = offset + items.len();
    let too_large = || PathError::IndexOutOfRange {
        index: raw.to_string(),
        len: current,
    };
    let target = usize::try_from(last_pos)
        .ok()
        .and_then(|pos| pos.checked_add(1))
        .ok_or_else(too_large)?;
    if target <= current {
        return Ok(());
    }
    items
        .try_reserve(target - current)
        .map_err(|_| too_large())?;
    debug!(from = current, to = target, "padding sequence");
    for pos in current..target {
        items.push(fill(pos));
    }
    Ok(())
}

fn scalar_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_existing_dict_path() {
        let mut doc = json!({"a": {"b": {"c": 42}}});
        set(&mut doc, "a.b.c", json!("updated")).unwrap();
        assert_eq!(doc["a"]["b"]["c"], json!("updated"));
    }

    #[test]
    fn test_set_creates_maps() {
        let mut doc = json!({});
        set(&mut doc, "x.y.z", json!("new_value")).unwrap();
        assert_eq!(doc, json!({"x": {"y": {"z": "new_value"}}}));
    }

    #[test]
    fn test_set_existing_sequence_path() {
        let mut doc = json!({"a": [{"b": 1}, {"b": 2}, {"b": 3}]});
        set(&mut doc, "a.1.b", json!(99)).unwrap();
        assert_eq!(doc["a"][1]["b"], json!(99));
    }

    #[test]
    fn test_set_extends_sequence() {
        let mut doc = json!({"a": [{"b": 1}, {"b": 2}, {"b": 3}]});
        set(&mut doc, "a.3.b", json!(4)).unwrap();
        assert_eq!(doc["a"][3], json!({"b": 4}));

        let mut doc = json!({"a": [1]});
        set(&mut doc, "a[3].b", json!(4)).unwrap();
        assert_eq!(doc, json!({"a": [1, {}, {}, {"b": 4}]}));
    }

    #[test]
    fn test_set_append() {
        let mut doc = json!({"a": [1, 2, 3]});
        set(&mut doc, "a.append", json!(4)).unwrap();
        assert_eq!(doc["a"], json!([1, 2, 3, 4]));

        let mut doc = json!([]);
        set(&mut doc, "append", json!("x")).unwrap();
        assert_eq!(doc, json!(["x"]));
    }

    #[test]
    fn test_set_append_on_map_fails() {
        let mut doc = json!({"a": {"b": {"c": 42}}});
        let err = set(&mut doc, "a.append.x", json!("invalid_append")).unwrap_err();
        assert_eq!(err, PathError::AppendOnNonSequence { found: "map" });

        let err = set(&mut doc, "a.append", json!(1)).unwrap_err();
        assert_eq!(err, PathError::AppendOnNonSequence { found: "map" });
    }

    #[test]
    fn test_set_index_past_end_fails() {
        let mut doc = json!({"a": [1, 2, 3]});
        let err = set(&mut doc, "a.5", json!(10)).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfRange {
                index: "5".to_string(),
                len: 3
            }
        );
        assert_eq!(doc, json!({"a": [1, 2, 3]}));
    }

    #[test]
    fn test_set_index_at_len_appends() {
        let mut doc = json!({"a": [1, 2, 3]});
        set(&mut doc, "a.3", json!(4)).unwrap();
        assert_eq!(doc["a"], json!([1, 2, 3, 4]));
    }

    #[test]
    fn test_set_negative_index() {
        let mut doc = json!({"a": [1, 2, 3]});
        set(&mut doc, "a.-1", json!(30)).unwrap();
        assert_eq!(doc["a"], json!([1, 2, 30]));

        let err = set(&mut doc, "a.-4", json!(0)).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfRange {
                index: "-4".to_string(),
                len: 3
            }
        );
    }

    #[test]
    fn test_set_eager_prefix_append() {
        let mut doc = json!({"a": [1]});
        set(&mut doc, "a.append.0", json!(9)).unwrap();
        assert_eq!(doc["a"], json!([9, 9]));
    }

    #[test]
    fn test_set_slice_pads_and_descends() {
        let mut doc = json!({"a": []});
        set(&mut doc, "a.0:2.0.k", json!("v")).unwrap();
        assert_eq!(doc["a"], json!([{"k": "v"}, {}, []]));
    }

    #[test]
    fn test_set_slice_copy_leaves_sequence_alone() {
        let original = json!({"a": [0, 1, 2, 3, 4]});

        for path in ["a.1:2.2", "a.0:1.append", "a.1:2.0", "a.0:0.1"] {
            let mut doc = original.clone();
            set(&mut doc, path, json!("new")).unwrap();
            assert_eq!(doc, original, "path {path:?}");
        }
    }

    #[test]
    fn test_set_slice_shares_containers() {
        let mut doc = json!({"a": [{}, {}]});
        set(&mut doc, "a.0:1.0.k", json!("v")).unwrap();
        assert_eq!(doc, json!({"a": [{"k": "v"}, {}]}));

        let mut doc = json!({"a": [[1], [2]]});
        set(&mut doc, "a.1:1.0.append", json!(3)).unwrap();
        assert_eq!(doc, json!({"a": [[1], [2, 3]]}));
    }

    #[test]
    fn test_set_slice_padding_reaches_root() {
        let mut doc = json!({"a": []});
        set(&mut doc, "a.1:2.0.k", json!(1)).unwrap();
        assert_eq!(doc, json!({"a": [{}, {"k": 1}, []]}));
    }

    #[test]
    fn test_set_inside_slice_copy_still_checks_path() {
        let mut doc = json!({"a": [{}]});
        // Index 1 only exists in the copy, so nothing lands...
        set(&mut doc, "a.0:0.1.k", json!(1)).unwrap();
        assert_eq!(doc, json!({"a": [{}]}));

        // ...but a bad path below it is still an error.
        let err = set(&mut doc, "a.0:0.1.append", json!(1)).unwrap_err();
        assert_eq!(err, PathError::AppendOnNonSequence { found: "map" });
    }

    #[test]
    fn test_set_slice_as_last_segment_fails() {
        let mut doc = json!({"a": [1, 2]});
        let err = set(&mut doc, "a.0:1", json!(0)).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfRange {
                index: "0:1".to_string(),
                len: 2
            }
        );
    }

    #[test]
    fn test_set_huge_index_fails_without_padding() {
        let mut doc = json!({"a": []});
        let err = set(&mut doc, "a.9223372036854775807.b", json!(0)).unwrap_err();
        assert_eq!(
            err,
            PathError::IndexOutOfRange {
                index: "9223372036854775807".to_string(),
                len: 0
            }
        );

        let err = set(&mut doc, "a.0:9223372036854775807.b", json!(0)).unwrap_err();
        assert!(matches!(err, PathError::IndexOutOfRange { len: 0, .. }));
        assert_eq!(doc, json!({"a": []}));
    }

    #[test]
    fn test_set_field_on_sequence_fails() {
        let mut doc = json!({"a": [1, 2]});
        let err = set(&mut doc, "a.b.c", json!(0)).unwrap_err();
        assert_eq!(err, PathError::InvalidIndex("b".to_string()));
    }

    #[test]
    fn test_set_through_scalar_fails() {
        let mut doc = json!({"a": 1});
        let err = set(&mut doc, "a.b", json!(0)).unwrap_err();
        assert_eq!(
            err,
            PathError::NotAContainer {
                token: "b".to_string(),
                found: "number"
            }
        );
    }

    #[test]
    fn test_set_numeric_keys_on_maps() {
        let mut doc = json!({});
        set(&mut doc, "a.0.b", json!(1)).unwrap();
        assert_eq!(doc, json!({"a": {"0": {"b": 1}}}));
    }
}
