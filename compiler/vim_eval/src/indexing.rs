//! Reading `expr[idx]` and `expr[from : to]`.
//!
//! Lists and Blobs accept negative indexes counted from the end. Strings are
//! indexed by character; an index past either end gives the empty string
//! rather than an error. A Number is indexed through its decimal text.

use vim_value::errors::{
    blob_index_out_of_range, cannot_index_funcref, cannot_slice_dict, key_not_present,
    list_index_out_of_range,
};
use vim_value::{resolve_index, EvalError, EvalErrorKind, Value};

/// `base[index]`.
pub fn index_value(base: &Value, index: &Value) -> Result<Value, EvalError> {
    match base {
        Value::List(list) => {
            let n = index.as_number()?;
            list.resolve_index(n)
                .and_then(|i| list.get(i))
                .ok_or_else(|| list_index_out_of_range(n))
        }
        Value::Dict(dict) => {
            let key = index.as_string()?;
            dict.get(&key).ok_or_else(|| key_not_present(&key))
        }
        Value::String(text) => Ok(string_char(text, index.as_number()?)),
        Value::Number(n) => Ok(string_char(&n.to_string(), index.as_number()?)),
        Value::Blob(bytes) => {
            let n = index.as_number()?;
            resolve_index(n, bytes.len())
                .and_then(|i| bytes.get(i))
                .map(|b| Value::Number(i64::from(*b)))
                .ok_or_else(|| blob_index_out_of_range(n))
        }
        Value::Float(_) => Err(EvalError::from_kind(EvalErrorKind::FloatAsString)),
        Value::Funcref(_) => Err(cannot_index_funcref()),
    }
}

fn string_char(text: &str, index: i64) -> Value {
    usize::try_from(index)
        .ok()
        .and_then(|i| text.chars().nth(i))
        .map_or_else(Value::empty_string, |c| Value::string(c.to_string()))
}

/// Resolve inclusive `[from : to]` bounds against `len`.
///
/// A negative bound counts from the end. A start before the beginning
/// clamps to 0 and an end past the end clamps to the last item. `None`
/// means the result is empty.
pub fn slice_bounds(len: usize, from: Option<i64>, to: Option<i64>) -> Option<(usize, usize)> {
    let len = i64::try_from(len).ok()?;
    let mut start = from.unwrap_or(0);
    if start < 0 {
        start = (len + start).max(0);
    }
    let mut end = to.unwrap_or(-1);
    if end < 0 {
        end += len;
    } else if end >= len {
        end = len - 1;
    }
    if start >= len || end < start {
        return None;
    }
    Some((usize::try_from(start).ok()?, usize::try_from(end).ok()?))
}

/// `base[from : to]`, both ends inclusive.
pub fn slice_value(base: &Value, from: Option<i64>, to: Option<i64>) -> Result<Value, EvalError> {
    match base {
        Value::List(list) => {
            let items = list.items();
            Ok(Value::list(match slice_bounds(items.len(), from, to) {
                Some((start, end)) => items[start..=end].to_vec(),
                None => Vec::new(),
            }))
        }
        Value::String(text) => Ok(slice_string(text, from, to)),
        Value::Number(n) => Ok(slice_string(&n.to_string(), from, to)),
        Value::Blob(bytes) => Ok(Value::blob(match slice_bounds(bytes.len(), from, to) {
            Some((start, end)) => bytes[start..=end].to_vec(),
            None => Vec::new(),
        })),
        Value::Dict(_) => Err(cannot_slice_dict()),
        Value::Float(_) => Err(EvalError::from_kind(EvalErrorKind::FloatAsString)),
        Value::Funcref(_) => Err(cannot_index_funcref()),
    }
}

fn slice_string(text: &str, from: Option<i64>, to: Option<i64>) -> Value {
    let chars: Vec<char> = text.chars().collect();
    match slice_bounds(chars.len(), from, to) {
        Some((start, end)) => Value::string(chars[start..=end].iter().collect::<String>()),
        None => Value::empty_string(),
    }
}
