//! Binary operators.
//!
//! Direct enum dispatch over the operator and the operand kinds. The rules
//! follow Vim's: arithmetic goes through the Number/Float coercions (so
//! `'abc' - 3` is `-3` and `{} - 1` is `E728`), `.` concatenates the String
//! forms, and comparisons check container kinds before anything is coerced.

use std::cmp::Ordering;

use vim_ir::{BinaryOp, CompareOp};
use vim_stack::ensure_sufficient_stack;
use vim_value::errors::{
    compare_dict_with_non_dict, compare_list_with_non_list, float_modulo,
    invalid_blob_operation, invalid_dict_operation, invalid_funcref_operation,
    invalid_list_operation,
};
use vim_value::{EvalError, Value};

use crate::collaborators::PatternMatcher;

/// Nesting beyond which two containers are taken to be equal, as Vim does to
/// stop comparing self-referencing structures.
const MAX_EQUALITY_DEPTH: usize = 1000;

/// Evaluate a binary operation on two already evaluated operands.
///
/// `&&` and `||` short-circuit in the interpreter; here they only combine
/// two truth values.
pub fn evaluate_binary(
    left: &Value,
    right: &Value,
    op: BinaryOp,
    ignore_case: bool,
    matcher: &dyn PatternMatcher,
) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(left, right, op)
        }
        BinaryOp::Concat => {
            let mut text = left.as_string()?.into_owned();
            text.push_str(&right.as_string()?);
            Ok(Value::string(text))
        }
        BinaryOp::And => Ok(Value::bool(left.as_boolean()? && right.as_boolean()?)),
        BinaryOp::Or => Ok(Value::bool(left.as_boolean()? || right.as_boolean()?)),
        BinaryOp::Compare(cmp, case) => {
            let ignore_case = case.ignores_case(ignore_case);
            compare(left, right, cmp, ignore_case, matcher).map(Value::bool)
        }
    }
}

fn add(left: &Value, right: &Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            let mut items = a.items();
            items.extend(b.items());
            Ok(Value::list(items))
        }
        (Value::Blob(a), Value::Blob(b)) => {
            let mut bytes = a.to_vec();
            bytes.extend_from_slice(b);
            Ok(Value::blob(bytes))
        }
        _ => arithmetic(left, right, BinaryOp::Add),
    }
}

fn arithmetic(left: &Value, right: &Value, op: BinaryOp) -> Result<Value, EvalError> {
    if matches!(left, Value::Float(_)) || matches!(right, Value::Float(_)) {
        let (a, b) = (left.as_double()?, right.as_double()?);
        return match op {
            BinaryOp::Add => Ok(Value::Float(a + b)),
            BinaryOp::Sub => Ok(Value::Float(a - b)),
            BinaryOp::Mul => Ok(Value::Float(a * b)),
            BinaryOp::Div => Ok(Value::Float(a / b)),
            _ => Err(float_modulo()),
        };
    }
    let (a, b) = (left.as_number()?, right.as_number()?);
    Ok(Value::Number(match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => divide(a, b),
        _ => remainder(a, b),
    }))
}

/// Number division; dividing by zero gives the largest magnitude with the
/// dividend's sign instead of failing.
pub fn divide(a: i64, b: i64) -> i64 {
    if b != 0 {
        return a.wrapping_div(b);
    }
    match a.cmp(&0) {
        Ordering::Greater => i64::MAX,
        Ordering::Less => -i64::MAX,
        Ordering::Equal => i64::MIN,
    }
}

/// Number remainder; `x % 0` is 0.
pub fn remainder(a: i64, b: i64) -> i64 {
    if b == 0 {
        0
    } else {
        a.wrapping_rem(b)
    }
}

/// Compare two values with a comparison operator.
///
/// Lists, Dictionaries, Funcrefs and Blobs only support the equality
/// operators and only against their own kind (Funcrefs compare unequal to
/// anything else). Floats compare numerically, then Numbers, and anything
/// left compares as Strings.
pub fn compare(
    left: &Value,
    right: &Value,
    op: CompareOp,
    ignore_case: bool,
    matcher: &dyn PatternMatcher,
) -> Result<bool, EvalError> {
    let identity = matches!(op, CompareOp::Is | CompareOp::IsNot);
    let negated = matches!(op, CompareOp::NotEq | CompareOp::IsNot | CompareOp::NoMatch);
    if identity && left.value_type() != right.value_type() {
        return Ok(negated);
    }

    let equal = match (left, right) {
        (Value::List(a), Value::List(b)) => {
            if !op.is_equality() {
                return Err(invalid_list_operation());
            }
            if identity {
                a.ptr_eq(b)
            } else {
                values_equal(left, right, ignore_case)
            }
        }
        (Value::List(_), _) | (_, Value::List(_)) => return Err(compare_list_with_non_list()),
        (Value::Dict(a), Value::Dict(b)) => {
            if !op.is_equality() {
                return Err(invalid_dict_operation());
            }
            if identity {
                a.ptr_eq(b)
            } else {
                values_equal(left, right, ignore_case)
            }
        }
        (Value::Dict(_), _) | (_, Value::Dict(_)) => return Err(compare_dict_with_non_dict()),
        (Value::Funcref(_), _) | (_, Value::Funcref(_)) => {
            if !op.is_equality() {
                return Err(invalid_funcref_operation());
            }
            values_equal(left, right, ignore_case)
        }
        (Value::Blob(a), Value::Blob(b)) => {
            if !op.is_equality() {
                return Err(invalid_blob_operation());
            }
            if identity {
                std::rc::Rc::ptr_eq(a, b)
            } else {
                a == b
            }
        }
        (Value::Blob(_), _) | (_, Value::Blob(_)) => return Err(invalid_blob_operation()),
        _ if matches!(op, CompareOp::Match | CompareOp::NoMatch) => {
            let text = left.as_string()?;
            let pattern = right.as_string()?;
            matcher.is_match(&pattern, &text, ignore_case)?
        }
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            let ordering = left.as_double()?.partial_cmp(&right.as_double()?);
            // NaN is unordered: only `!=` holds.
            return Ok(ordering.map_or(negated, |ord| ordering_holds(op, ord)));
        }
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            let ordering = left.as_number()?.cmp(&right.as_number()?);
            return Ok(ordering_holds(op, ordering));
        }
        _ => {
            let (a, b) = (left.as_string()?, right.as_string()?);
            let ordering = if ignore_case {
                a.to_lowercase().cmp(&b.to_lowercase())
            } else {
                a.as_bytes().cmp(b.as_bytes())
            };
            return Ok(ordering_holds(op, ordering));
        }
    };
    Ok(equal != negated)
}

fn ordering_holds(op: CompareOp, ordering: Ordering) -> bool {
    match op {
        CompareOp::Eq | CompareOp::Is => ordering == Ordering::Equal,
        CompareOp::NotEq | CompareOp::IsNot => ordering != Ordering::Equal,
        CompareOp::Gt => ordering == Ordering::Greater,
        CompareOp::GtEq => ordering != Ordering::Less,
        CompareOp::Lt => ordering == Ordering::Less,
        CompareOp::LtEq => ordering != Ordering::Greater,
        CompareOp::Match | CompareOp::NoMatch => false,
    }
}

/// Vim's `==` on values of any kind: types must match exactly
/// (`[1] != ['1']`), containers compare item by item.
pub fn values_equal(left: &Value, right: &Value, ignore_case: bool) -> bool {
    equal_at_depth(left, right, ignore_case, 0)
}

fn equal_at_depth(left: &Value, right: &Value, ignore_case: bool, depth: usize) -> bool {
    if depth >= MAX_EQUALITY_DEPTH {
        return true;
    }
    ensure_sufficient_stack(|| match (left, right) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::String(a), Value::String(b)) => {
            if ignore_case {
                a.to_lowercase() == b.to_lowercase()
            } else {
                a == b
            }
        }
        (Value::List(a), Value::List(b)) => {
            if a.ptr_eq(b) {
                return true;
            }
            let (a, b) = (a.items(), b.items());
            a.len() == b.len()
                && a.iter()
                    .zip(&b)
                    .all(|(x, y)| equal_at_depth(x, y, ignore_case, depth + 1))
        }
        (Value::Dict(a), Value::Dict(b)) => {
            if a.ptr_eq(b) {
                return true;
            }
            a.len() == b.len()
                && a.entries().iter().all(|(key, x)| {
                    b.get(key)
                        .is_some_and(|y| equal_at_depth(x, &y, ignore_case, depth + 1))
                })
        }
        (Value::Funcref(a), Value::Funcref(b)) => a == b,
        (Value::Blob(a), Value::Blob(b)) => a == b,
        _ => false,
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
