//! Type inspection and conversion builtins.

use vim_value::errors::{invalid_argument, number_or_float_required};
use vim_value::number::{parse_float, parse_number_radix, Radix};
use vim_value::{EvalResult, Value};

use super::flag_arg;
use crate::host::EditorContext;
use crate::interpreter::Interpreter;

/// `type()`
pub(super) fn type_of(
    _: &mut Interpreter,
    args: &[Value],
    _: &mut dyn EditorContext,
) -> EvalResult {
    Ok(Value::Number(args[0].value_type().code()))
}

pub(super) fn string(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    Ok(Value::string(args[0].to_string_repr()))
}

/// `str2nr({string} [, {base} [, {quoted}]])`; base 10 unless given.
pub(super) fn str2nr(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    let radix = match args.get(1) {
        Some(base) => {
            let base = base.as_number()?;
            Radix::from_base(base).ok_or_else(|| invalid_argument(&base.to_string()))?
        }
        None => Radix::Decimal,
    };
    let text = args[0].as_string()?;
    let n = if flag_arg(args, 2)? {
        parse_number_radix(&text.replace('\'', ""), radix)
    } else {
        parse_number_radix(&text, radix)
    };
    Ok(Value::Number(n))
}

/// `str2float({string} [, {quoted}])`
pub(super) fn str2float(
    _: &mut Interpreter,
    args: &[Value],
    _: &mut dyn EditorContext,
) -> EvalResult {
    let text = args[0].as_string()?;
    let f = if flag_arg(args, 1)? {
        parse_float(&text.replace('\'', ""))
    } else {
        parse_float(&text)
    };
    Ok(Value::Float(f))
}

/// `float2nr()`: truncate toward zero, saturating at the Number range.
pub(super) fn float2nr(
    _: &mut Interpreter,
    args: &[Value],
    _: &mut dyn EditorContext,
) -> EvalResult {
    match &args[0] {
        Value::Float(f) => Ok(Value::Number(truncate(*f))),
        Value::Number(n) => Ok(Value::Number(*n)),
        _ => Err(number_or_float_required().into()),
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "float-to-int `as` saturates, which is the wanted behaviour"
)]
fn truncate(f: f64) -> i64 {
    if f.is_nan() {
        0
    } else {
        f.trunc() as i64
    }
}

pub(super) fn abs(_: &mut Interpreter, args: &[Value], _: &mut dyn EditorContext) -> EvalResult {
    match &args[0] {
        Value::Float(f) => Ok(Value::Float(f.abs())),
        Value::List(_) | Value::Dict(_) | Value::Funcref(_) | Value::Blob(_) => {
            Err(number_or_float_required().into())
        }
        other => {
            let n = other.as_number()?;
            Ok(Value::Number(n.checked_abs().unwrap_or(i64::MAX)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_saturates() {
        assert_eq!(truncate(-2.9), -2);
        assert_eq!(truncate(1e300), i64::MAX);
        assert_eq!(truncate(-1e300), i64::MIN);
        assert_eq!(truncate(f64::NAN), 0);
    }
}
