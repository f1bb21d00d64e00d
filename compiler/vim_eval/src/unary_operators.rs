//! Unary operators.

use vim_ir::UnaryOp;
use vim_value::{EvalError, Value};

/// `!x`, `-x`, `+x`.
///
/// A Float stays a Float under `-` and `+`; everything else goes through the
/// Number coercion, so `-'abc'` is `0` and `-[1]` is `E745`.
pub fn evaluate_unary(operand: &Value, op: UnaryOp) -> Result<Value, EvalError> {
    match op {
        UnaryOp::Not => Ok(Value::bool(!operand.as_boolean()?)),
        UnaryOp::Neg => match operand {
            Value::Float(f) => Ok(Value::Float(-f)),
            other => Ok(Value::Number(other.as_number()?.wrapping_neg())),
        },
        UnaryOp::Plus => match operand {
            Value::Float(f) => Ok(Value::Float(*f)),
            other => Ok(Value::Number(other.as_number()?)),
        },
    }
}
