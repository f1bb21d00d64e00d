//! List and Dictionary builtins.

use std::cmp::Ordering;
use std::rc::Rc;

use vim_value::errors::{
    dict_required, invalid_argument, invalid_len_type, key_exists, key_not_present,
    list_dict_or_blob_required, list_index_out_of_range, list_or_blob_required,
    list_or_dict_argument_required, not_implemented, start_past_end, stride_zero,
    too_many_arguments,
};
use vim_value::{
    resolve_index, ControlAction, DictHandle, EvalError, EvalResult, FuncrefValue, Value,
};

use super::{flag_arg, list_arg, number, number_arg};
use crate::host::EditorContext;
use crate::interpreter::{CallTarget, Interpreter};
use crate::operators::values_equal;

pub(super) fn len(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    Ok(match &args[0] {
        Value::Number(n) => number(n.to_string().len()),
        Value::String(s) => number(s.len()),
        Value::List(list) => number(list.len()),
        Value::Dict(dict) => number(dict.len()),
        Value::Blob(bytes) => number(bytes.len()),
        Value::Float(_) | Value::Funcref(_) => return Err(invalid_len_type().into()),
    })
}

pub(super) fn empty(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let is_empty = match &args[0] {
        Value::Number(n) => *n == 0,
        Value::Float(f) => *f == 0.0,
        Value::String(s) => s.is_empty(),
        Value::List(list) => list.is_empty(),
        Value::Dict(dict) => dict.is_empty(),
        Value::Blob(bytes) => bytes.is_empty(),
        Value::Funcref(_) => false,
    };
    Ok(Value::bool(is_empty))
}

/// `get({list}, {idx} [, {default}])`, `get({dict}, {key} [, {default}])`,
/// `get({func}, {what})`.
pub(super) fn get(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let default = || args.get(2).cloned().unwrap_or(Value::Number(0));
    match &args[0] {
        Value::List(list) => {
            let n = args[1].as_number()?;
            Ok(list
                .resolve_index(n)
                .and_then(|i| list.get(i))
                .unwrap_or_else(default))
        }
        Value::Dict(dict) => Ok(dict.get(&args[1].as_string()?).unwrap_or_else(default)),
        Value::Blob(bytes) => {
            let n = args[1].as_number()?;
            Ok(resolve_index(n, bytes.len())
                .and_then(|i| bytes.get(i))
                .map_or_else(default, |b| Value::Number(i64::from(*b))))
        }
        Value::Funcref(funcref) => {
            let what = args[1].as_string()?;
            match &*what {
                "name" => Ok(Value::string(funcref.name())),
                "func" => Ok(Value::funcref(FuncrefValue::new(
                    funcref.handle.clone(),
                    funcref.kind,
                ))),
                "dict" => Ok(funcref
                    .dict
                    .clone()
                    .map_or(Value::Number(0), Value::Dict)),
                "args" => Ok(Value::list(funcref.arguments.clone())),
                _ => Err(invalid_argument(&what).into()),
            }
        }
        _ => Err(list_dict_or_blob_required("get").into()),
    }
}

pub(super) fn has_key(
    _: &mut Interpreter,
    args: &[Value],
    _: &mut dyn EditorContext,
) -> EvalResult {
    let dict = dict_arg(&args[0])?;
    Ok(Value::bool(dict.contains_key(&args[1].as_string()?)))
}

pub(super) fn keys(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let keys = dict_arg(&args[0])?.keys();
    Ok(Value::list(keys.into_iter().map(Value::string).collect()))
}

pub(super) fn values(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    Ok(Value::list(dict_arg(&args[0])?.values()))
}

pub(super) fn items(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let pairs = dict_arg(&args[0])?
        .entries()
        .into_iter()
        .map(|(key, value)| Value::list(vec![Value::string(key), value]))
        .collect();
    Ok(Value::list(pairs))
}

pub(super) fn add(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    match &args[0] {
        Value::List(list) => {
            list.push(args[1].clone(), "add() argument")?;
            Ok(args[0].clone())
        }
        Value::Blob(_) => Err(not_implemented("add() on a Blob").into()),
        _ => Err(list_or_blob_required().into()),
    }
}

/// `insert({list}, {item} [, {idx}])`; `idx` may equal the length.
pub(super) fn insert(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let list = match &args[0] {
        Value::List(list) => list,
        Value::Blob(_) => return Err(not_implemented("insert() on a Blob").into()),
        _ => return Err(list_or_blob_required().into()),
    };
    let n = number_arg(args, 2, 0)?;
    let len = i64::try_from(list.len()).unwrap_or(i64::MAX);
    let position = if n < 0 { n + len } else { n };
    let position = usize::try_from(position)
        .ok()
        .filter(|p| *p <= list.len())
        .ok_or_else(|| list_index_out_of_range(n))?;
    list.insert(position, args[1].clone(), "insert() argument")?;
    Ok(args[0].clone())
}

/// `remove({list}, {idx} [, {end}])`, `remove({dict}, {key})`.
pub(super) fn remove(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    match &args[0] {
        Value::List(list) => {
            let first = args[1].as_number()?;
            let start = list
                .resolve_index(first)
                .ok_or_else(|| list_index_out_of_range(first))?;
            let Some(last) = args.get(2) else {
                let mut removed = list.remove_range(start, start, "remove() argument")?;
                return Ok(removed.pop().unwrap_or(Value::Number(0)));
            };
            let last = last.as_number()?;
            let end = list
                .resolve_index(last)
                .ok_or_else(|| list_index_out_of_range(last))?;
            if end < start {
                return Err(invalid_argument(&last.to_string()).into());
            }
            Ok(Value::list(list.remove_range(start, end, "remove() argument")?))
        }
        Value::Dict(dict) => {
            if args.len() > 2 {
                return Err(too_many_arguments("remove").into());
            }
            let key = args[1].as_string()?;
            dict.remove(&key, "remove() argument")?
                .ok_or_else(|| key_not_present(&key).into())
        }
        Value::Blob(_) => Err(not_implemented("remove() on a Blob").into()),
        _ => Err(list_dict_or_blob_required("remove").into()),
    }
}

/// `extend({list}, {list} [, {idx}])`, `extend({dict}, {dict} [, {how}])`.
pub(super) fn extend(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    match (&args[0], &args[1]) {
        (Value::List(target), Value::List(source)) => {
            let len = i64::try_from(target.len()).unwrap_or(i64::MAX);
            let n = number_arg(args, 2, len)?;
            let position = if n < 0 { n + len } else { n };
            let position = usize::try_from(position)
                .ok()
                .filter(|p| *p <= target.len())
                .ok_or_else(|| list_index_out_of_range(n))?;
            target.splice(position, 0, source.items(), "extend() argument")?;
        }
        (Value::Dict(target), Value::Dict(source)) => {
            let how = match args.get(2) {
                Some(how) => how.as_string()?.into_owned(),
                None => "force".to_string(),
            };
            if !matches!(how.as_str(), "force" | "keep" | "error") {
                return Err(invalid_argument(&how).into());
            }
            for (key, value) in source.entries() {
                if target.contains_key(&key) {
                    match how.as_str() {
                        "keep" => continue,
                        "error" => return Err(key_exists(&key).into()),
                        _ => {}
                    }
                }
                target.insert(&key, value, "extend() argument")?;
            }
        }
        _ => return Err(list_or_dict_argument_required("extend").into()),
    }
    Ok(args[0].clone())
}

pub(super) fn copy(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    Ok(args[0].deep_copy(1))
}

pub(super) fn deepcopy(
    interp: &mut Interpreter,
    args: &[Value],
    _: &mut dyn EditorContext,
) -> EvalResult {
    Ok(args[0].deep_copy_limited(usize::MAX, interp.config.max_copy_depth)?)
}

/// `index({list}, {expr} [, {start} [, {ic}]])`: first item equal to
/// `expr` with the same type, or -1.
pub(super) fn index(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let list = match &args[0] {
        Value::List(list) => list,
        Value::Blob(_) => return Err(not_implemented("index() on a Blob").into()),
        _ => return Err(list_or_blob_required().into()),
    };
    let items = list.items();
    let start = number_arg(args, 2, 0)?;
    let start = if start < 0 {
        list.resolve_index(start).unwrap_or(0)
    } else {
        usize::try_from(start).unwrap_or(usize::MAX)
    };
    let ignore_case = flag_arg(args, 3)?;
    let found = items
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, item)| values_equal(item, &args[1], ignore_case))
        .map(|(i, _)| i);
    Ok(found.map_or(Value::Number(-1), number))
}

pub(super) fn reverse(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    match &args[0] {
        Value::List(list) => {
            let mut items = list.items();
            items.reverse();
            list.replace_items(items, "reverse() argument")?;
            Ok(args[0].clone())
        }
        Value::Blob(bytes) => Ok(Value::blob(bytes.iter().rev().copied().collect::<Vec<_>>())),
        _ => Err(list_or_blob_required().into()),
    }
}

/// `range({expr} [, {max} [, {stride}]])`
pub(super) fn range(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let (start, end) = match args.get(1) {
        Some(max) => (args[0].as_number()?, max.as_number()?),
        None => (0, args[0].as_number()? - 1),
    };
    let stride = number_arg(args, 2, 1)?;
    if stride == 0 {
        return Err(stride_zero().into());
    }
    let past_end = if stride > 0 {
        end.saturating_add(1) < start
    } else {
        end.saturating_sub(1) > start
    };
    if past_end {
        return Err(start_past_end().into());
    }
    let mut values = Vec::new();
    let mut current = start;
    while (stride > 0 && current <= end) || (stride < 0 && current >= end) {
        values.push(Value::Number(current));
        match current.checked_add(stride) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(Value::list(values))
}

pub(super) fn max(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    extreme("max", &args[0], Ordering::Greater)
}

pub(super) fn min(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    extreme("min", &args[0], Ordering::Less)
}

/// Largest or smallest Number among the items; 0 when empty.
fn extreme(function: &str, container: &Value, wanted: Ordering) -> EvalResult {
    let items = match container {
        Value::List(list) => list.items(),
        Value::Dict(dict) => dict.values(),
        _ => return Err(list_or_dict_argument_required(function).into()),
    };
    let mut best: Option<i64> = None;
    for item in &items {
        let n = item.as_number()?;
        if best.map_or(true, |b| n.cmp(&b) == wanted) {
            best = Some(n);
        }
    }
    Ok(Value::Number(best.unwrap_or(0)))
}

/// How `sort()` orders items.
enum SortOrder {
    /// By string form.
    Text { ignore_case: bool },
    /// `'n'`: Numbers and Floats by value, everything else as 0.
    Numeric,
    /// `'N'`: like `'n'` but Strings are parsed.
    NumericText,
    /// `'f'`: Floats and Numbers by value.
    Float,
    /// A comparison function returning negative, zero or positive.
    Function(Value),
}

/// `sort({list} [, {how} [, {dict}]])`, stable.
pub(super) fn sort(
    interp: &mut Interpreter,
    args: &[Value],
    ctx: &mut dyn EditorContext,
) -> EvalResult {
    let list = list_arg("sort", &args[0])?;
    let order = match args.get(1) {
        None => SortOrder::Text { ignore_case: false },
        Some(Value::Funcref(_)) => SortOrder::Function(args[1].clone()),
        Some(Value::String(how)) => match &**how {
            "" => SortOrder::Text { ignore_case: false },
            "i" => SortOrder::Text { ignore_case: true },
            "n" => SortOrder::Numeric,
            "N" => SortOrder::NumericText,
            "f" => SortOrder::Float,
            _ => SortOrder::Function(args[1].clone()),
        },
        Some(flag) => SortOrder::Text {
            ignore_case: flag.as_number()? == 1,
        },
    };
    let dict = match args.get(2) {
        Some(Value::Dict(dict)) => Some(dict.clone()),
        Some(_) => return Err(dict_required().into()),
        None => None,
    };

    let mut items = list.items();
    let mut failure = None;
    items.sort_by(|a, b| {
        if failure.is_some() {
            return Ordering::Equal;
        }
        match sort_compare(interp, &order, dict.as_ref(), a, b, ctx) {
            Ok(ordering) => ordering,
            Err(action) => {
                failure = Some(action);
                Ordering::Equal
            }
        }
    });
    if let Some(action) = failure {
        return Err(action);
    }
    list.replace_items(items, "sort() argument")?;
    Ok(args[0].clone())
}

fn sort_compare(
    interp: &mut Interpreter,
    order: &SortOrder,
    dict: Option<&DictHandle>,
    a: &Value,
    b: &Value,
    ctx: &mut dyn EditorContext,
) -> Result<Ordering, ControlAction> {
    Ok(match order {
        SortOrder::Text { ignore_case } => {
            let (a, b) = (sort_text(a), sort_text(b));
            if *ignore_case {
                a.to_lowercase().cmp(&b.to_lowercase())
            } else {
                a.cmp(&b)
            }
        }
        SortOrder::Numeric => numeric_key(a).total_cmp(&numeric_key(b)),
        SortOrder::NumericText | SortOrder::Float => {
            let (a, b) = (text_number_key(a), text_number_key(b));
            a.total_cmp(&b)
        }
        SortOrder::Function(func) => {
            let funcref = match func {
                Value::Funcref(funcref) => funcref.clone(),
                other => {
                    let name = vim_ir::VarRef::parse(&other.as_string()?);
                    interp.resolve_named(&name, ctx)?
                }
            };
            let funcref = match dict {
                Some(dict) if funcref.dict.is_none() => Rc::new(funcref.bind_dict(dict.clone())),
                _ => funcref,
            };
            let result = interp.call_function(
                CallTarget::Funcref(&funcref),
                &[a.clone(), b.clone()],
                ctx,
            )?;
            result.as_number()?.cmp(&0)
        }
    })
}

/// Items sort by their text; Strings unquoted, anything else as `string()`.
fn sort_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        other => other.to_string_repr(),
    }
}

#[expect(clippy::cast_precision_loss, reason = "sort keys only need ordering")]
fn numeric_key(value: &Value) -> f64 {
    match value {
        Value::Number(n) => *n as f64,
        Value::Float(f) => *f,
        _ => 0.0,
    }
}

fn text_number_key(value: &Value) -> f64 {
    match value {
        Value::String(s) => vim_value::number::parse_float(s),
        other => numeric_key(other),
    }
}

/// `map({expr1}, {expr2})`: replace each item with `expr2` evaluated on it.
pub(super) fn map(
    interp: &mut Interpreter,
    args: &[Value],
    ctx: &mut dyn EditorContext,
) -> EvalResult {
    let mapper = ItemFunction::new(interp, &args[1])?;
    match &args[0] {
        Value::List(list) => {
            for (i, item) in list.items().into_iter().enumerate() {
                let value = mapper.apply(interp, number(i), item, ctx)?;
                list.set(i, value, "map() argument")?;
            }
        }
        Value::Dict(dict) => {
            for (key, item) in dict.entries() {
                let value = mapper.apply(interp, Value::string(key.as_str()), item, ctx)?;
                dict.insert(&key, value, "map() argument")?;
            }
        }
        Value::Blob(_) | Value::String(_) => {
            return Err(not_implemented("map() on a String or Blob").into());
        }
        _ => return Err(list_dict_or_blob_required("map").into()),
    }
    Ok(args[0].clone())
}

/// `filter({expr1}, {expr2})`: keep the items `expr2` is true for.
pub(super) fn filter(
    interp: &mut Interpreter,
    args: &[Value],
    ctx: &mut dyn EditorContext,
) -> EvalResult {
    let predicate = ItemFunction::new(interp, &args[1])?;
    match &args[0] {
        Value::List(list) => {
            list.check_structure("filter() argument")?;
            let mut kept = Vec::with_capacity(list.len());
            for (i, item) in list.items().into_iter().enumerate() {
                if predicate
                    .apply(interp, number(i), item.clone(), ctx)?
                    .as_boolean()?
                {
                    kept.push(item);
                }
            }
            list.replace_items(kept, "filter() argument")?;
        }
        Value::Dict(dict) => {
            for (key, item) in dict.entries() {
                let keep = predicate
                    .apply(interp, Value::string(key.as_str()), item, ctx)?
                    .as_boolean()?;
                if !keep {
                    dict.remove(&key, "filter() argument")?;
                }
            }
        }
        Value::Blob(_) | Value::String(_) => {
            return Err(not_implemented("filter() on a String or Blob").into());
        }
        _ => return Err(list_dict_or_blob_required("filter").into()),
    }
    Ok(args[0].clone())
}

/// Second argument of `map()` and `filter()`.
enum ItemFunction {
    /// Called with the key and the item.
    Funcref(Rc<FuncrefValue>),
    /// Evaluated with `v:key` and `v:val` set.
    Expr(vim_ir::Expr),
}

impl ItemFunction {
    fn new(interp: &Interpreter, value: &Value) -> Result<Self, EvalError> {
        if let Value::Funcref(funcref) = value {
            return Ok(ItemFunction::Funcref(funcref.clone()));
        }
        let text = value.as_string()?;
        let parser = interp
            .parser
            .as_ref()
            .ok_or_else(|| not_implemented("expression strings without a parser"))?;
        Ok(ItemFunction::Expr(parser.parse_expression(&text)?))
    }

    fn apply(
        &self,
        interp: &mut Interpreter,
        key: Value,
        item: Value,
        ctx: &mut dyn EditorContext,
    ) -> EvalResult {
        match self {
            ItemFunction::Funcref(funcref) => {
                interp.call_function(CallTarget::Funcref(funcref), &[key, item], ctx)
            }
            ItemFunction::Expr(expr) => {
                let vim_vars = interp.env.vim_vars().clone();
                let saved_key = vim_vars.get("key");
                let saved_val = vim_vars.get("val");
                vim_vars.define("key", key);
                vim_vars.define("val", item);
                let result = interp.eval_expr(expr, ctx);
                restore(&vim_vars, "key", saved_key);
                restore(&vim_vars, "val", saved_val);
                result
            }
        }
    }
}

fn restore(dict: &DictHandle, key: &str, saved: Option<Value>) {
    match saved {
        Some(value) => dict.define(key, value),
        None => {
            dict.undefine(key);
        }
    }
}

fn dict_arg(value: &Value) -> Result<&DictHandle, EvalError> {
    value.as_dict().ok_or_else(dict_required)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_keys() {
        assert!(numeric_key(&Value::string("10")).total_cmp(&0.0).is_eq());
        assert!(numeric_key(&Value::Number(3)).total_cmp(&3.0).is_eq());
        assert!(text_number_key(&Value::string("10")) > 9.0);
    }

    #[test]
    fn restore_puts_back_or_drops_the_binding() {
        let vars = DictHandle::new();
        vars.define("val", Value::Number(7));
        vars.lock_key("val");
        restore(&vars, "val", None);
        assert!(!vars.contains_key("val"));
        restore(&vars, "key", Some(Value::string("k")));
        assert_eq!(vars.get("key"), Some(Value::string("k")));
    }

    #[test]
    fn sort_text_quotes_only_non_strings() {
        assert_eq!(sort_text(&Value::string("b")), "b");
        assert_eq!(sort_text(&Value::list(vec![Value::string("a")])), "['a']");
    }
}
