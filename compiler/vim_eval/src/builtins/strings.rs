//! String builtins.

use vim_value::{EvalResult, Value};

use super::{list_arg, number};
use crate::host::EditorContext;
use crate::interpreter::Interpreter;

pub(super) fn strlen(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    Ok(number(args[0].as_string()?.len()))
}

pub(super) fn toupper(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    Ok(Value::string(args[0].as_string()?.to_uppercase()))
}

pub(super) fn tolower(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    Ok(Value::string(args[0].as_string()?.to_lowercase()))
}

/// `repeat({expr}, {count})`: a List repeats its items, anything else its
/// text.
pub(super) fn repeat(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let count = usize::try_from(args[1].as_number()?).unwrap_or(0);
    match &args[0] {
        Value::List(list) => {
            let items = list.items();
            let mut repeated = Vec::with_capacity(items.len().saturating_mul(count));
            for _ in 0..count {
                repeated.extend(items.iter().cloned());
            }
            Ok(Value::list(repeated))
        }
        other => Ok(Value::string(other.as_string()?.repeat(count))),
    }
}

/// `stridx({haystack}, {needle} [, {start}])`: byte index or -1.
pub(super) fn stridx(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let haystack = args[0].as_string()?;
    let needle = args[1].as_string()?;
    let start = match args.get(2) {
        Some(start) => start.as_number()?.max(0),
        None => 0,
    };
    let start = usize::try_from(start).unwrap_or(usize::MAX);
    if args.len() > 2 && start >= haystack.len() {
        return Ok(Value::Number(-1));
    }
    Ok(find_bytes(haystack.as_bytes(), needle.as_bytes(), start)
        .map_or(Value::Number(-1), number))
}

fn find_bytes(haystack: &[u8], needle: &[u8], start: usize) -> Option<usize> {
    let rest = haystack.get(start..)?;
    if needle.is_empty() {
        return Some(start);
    }
    rest.windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| start + offset)
}

/// `join({list} [, {sep}])`: Strings as they are, other items as `string()`.
pub(super) fn join(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let list = list_arg("join", &args[0])?;
    let separator = match args.get(1) {
        Some(sep) => sep.as_string()?.into_owned(),
        None => " ".to_string(),
    };
    let parts: Vec<String> = list
        .items()
        .iter()
        .map(|item| match item {
            Value::String(s) => s.to_string(),
            other => other.to_string_repr(),
        })
        .collect();
    Ok(Value::string(parts.join(&separator)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_bytes_from_offset() {
        assert_eq!(find_bytes(b"abcabc", b"bc", 0), Some(1));
        assert_eq!(find_bytes(b"abcabc", b"bc", 2), Some(4));
        assert_eq!(find_bytes(b"abc", b"x", 0), None);
        assert_eq!(find_bytes(b"abc", b"", 1), Some(1));
        assert_eq!(find_bytes(b"abc", b"a", 9), None);
    }
}
