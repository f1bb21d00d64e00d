use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vim_ir::CaseMode;

use super::*;
use crate::collaborators::SubstringMatcher;

fn binary(left: &Value, op: BinaryOp, right: &Value) -> Result<Value, EvalError> {
    evaluate_binary(left, right, op, false, &SubstringMatcher)
}

fn cmp(left: &Value, op: CompareOp, right: &Value) -> Result<bool, EvalError> {
    compare(left, right, op, false, &SubstringMatcher)
}

fn nums(values: &[i64]) -> Value {
    Value::list(values.iter().copied().map(Value::Number).collect())
}

// Arithmetic

#[test]
fn concat_uses_string_forms() {
    let result = binary(&Value::Number(2), BinaryOp::Concat, &Value::Number(3)).unwrap();
    assert_eq!(result, Value::string("23"));
}

#[test]
fn concat_rejects_float_and_containers() {
    let err = binary(&Value::Float(1.5), BinaryOp::Concat, &Value::string("x")).unwrap_err();
    assert_eq!(err.code(), Some("E806"));
    let err = binary(&Value::string("x"), BinaryOp::Concat, &nums(&[1])).unwrap_err();
    assert_eq!(err.code(), Some("E730"));
    let dict = Value::dict([("a", Value::Number(1))]);
    let err = binary(&dict, BinaryOp::Concat, &Value::string("x")).unwrap_err();
    assert_eq!(err.code(), Some("E731"));
}

#[test]
fn string_minus_number_reads_leading_digits() {
    let result = binary(&Value::string("string"), BinaryOp::Sub, &Value::Number(3)).unwrap();
    assert_eq!(result, Value::Number(-3));
    let result = binary(&Value::string("10apples"), BinaryOp::Add, &Value::Number(1)).unwrap();
    assert_eq!(result, Value::Number(11));
}

#[test]
fn dict_in_arithmetic_is_e728() {
    let dict = Value::dict([("k", Value::Number(1))]);
    let err = binary(&dict, BinaryOp::Sub, &Value::Number(1)).unwrap_err();
    assert_eq!(err.code(), Some("E728"));
}

#[test]
fn float_operand_makes_float_result() {
    let result = binary(&Value::Number(1), BinaryOp::Add, &Value::Float(0.5)).unwrap();
    assert_eq!(result, Value::Float(1.5));
    assert!(matches!(
        binary(&Value::Float(1.0), BinaryOp::Mul, &Value::Number(2)).unwrap(),
        Value::Float(_)
    ));
    let err = binary(&Value::Float(1.0), BinaryOp::Mod, &Value::Number(2)).unwrap_err();
    assert_eq!(err.code(), Some("E804"));
}

#[test]
fn list_addition_concatenates() {
    let a = nums(&[1, 2]);
    let b = nums(&[3]);
    let result = binary(&a, BinaryOp::Add, &b).unwrap();
    assert_eq!(result, nums(&[1, 2, 3]));
    assert!(!result.as_list().unwrap().ptr_eq(a.as_list().unwrap()));
    let err = binary(&a, BinaryOp::Sub, &b).unwrap_err();
    assert_eq!(err.code(), Some("E745"));
}

#[test]
fn division_by_zero_saturates() {
    assert_eq!(divide(7, 0), i64::MAX);
    assert_eq!(divide(-7, 0), -i64::MAX);
    assert_eq!(divide(0, 0), i64::MIN);
    assert_eq!(divide(7, 2), 3);
    assert_eq!(divide(-7, 2), -3);
    assert_eq!(remainder(7, 0), 0);
    assert_eq!(remainder(-7, 3), -1);
}

#[test]
fn integer_overflow_wraps() {
    let result = binary(&Value::Number(i64::MAX), BinaryOp::Add, &Value::Number(1)).unwrap();
    assert_eq!(result, Value::Number(i64::MIN));
}

// Comparison

#[test]
fn number_and_string_compare_numerically() {
    assert!(cmp(&Value::string("abc"), CompareOp::Eq, &Value::Number(0)).unwrap());
    assert!(cmp(&Value::string("10"), CompareOp::Gt, &Value::Number(9)).unwrap());
    assert!(cmp(&Value::Number(1), CompareOp::Eq, &Value::Float(1.0)).unwrap());
}

#[test]
fn strings_compare_bytewise_with_case_modes() {
    let (a, b) = (Value::string("abc"), Value::string("ABC"));
    assert!(!cmp(&a, CompareOp::Eq, &b).unwrap());
    assert!(compare(&a, &b, CompareOp::Eq, true, &SubstringMatcher).unwrap());
    let op = BinaryOp::Compare(CompareOp::Eq, CaseMode::IgnoreCase);
    assert_eq!(binary(&a, op, &b).unwrap(), Value::Number(1));
    let op = BinaryOp::Compare(CompareOp::Eq, CaseMode::MatchCase);
    assert_eq!(
        evaluate_binary(&a, &b, op, true, &SubstringMatcher).unwrap(),
        Value::Number(0)
    );
    assert!(cmp(&Value::string("b"), CompareOp::Gt, &Value::string("a")).unwrap());
}

#[test]
fn lists_only_support_equality() {
    let (a, b) = (nums(&[1, 2]), nums(&[1, 2]));
    assert!(cmp(&a, CompareOp::Eq, &b).unwrap());
    assert!(!cmp(&a, CompareOp::Is, &b).unwrap());
    assert!(cmp(&a, CompareOp::Is, &a.clone()).unwrap());
    assert_eq!(cmp(&a, CompareOp::Lt, &b).unwrap_err().code(), Some("E692"));
    assert_eq!(
        cmp(&a, CompareOp::Eq, &Value::Number(1)).unwrap_err().code(),
        Some("E691")
    );
}

#[test]
fn dicts_only_support_equality() {
    let a = Value::dict([("x", Value::Number(1))]);
    let b = Value::dict([("x", Value::Number(1))]);
    assert!(cmp(&a, CompareOp::Eq, &b).unwrap());
    assert!(cmp(&a, CompareOp::IsNot, &b).unwrap());
    assert_eq!(cmp(&a, CompareOp::Gt, &b).unwrap_err().code(), Some("E736"));
    assert_eq!(
        cmp(&a, CompareOp::Eq, &Value::string("x")).unwrap_err().code(),
        Some("E735")
    );
}

#[test]
fn nested_equality_is_type_strict() {
    assert!(!cmp(&nums(&[1]), CompareOp::Eq, &Value::list(vec![Value::string("1")])).unwrap());
    assert!(!cmp(&nums(&[1]), CompareOp::Eq, &Value::list(vec![Value::Float(1.0)])).unwrap());
}

#[test]
fn is_with_different_types_is_false() {
    assert!(!cmp(&Value::Number(1), CompareOp::Is, &Value::string("1")).unwrap());
    assert!(cmp(&Value::Number(1), CompareOp::IsNot, &Value::string("1")).unwrap());
    assert!(cmp(&Value::string("a"), CompareOp::Is, &Value::string("a")).unwrap());
}

#[test]
fn pattern_match_operators() {
    let text = Value::string("foobar");
    assert!(cmp(&text, CompareOp::Match, &Value::string("^foo")).unwrap());
    assert!(cmp(&text, CompareOp::NoMatch, &Value::string("baz")).unwrap());
    assert!(cmp(&Value::Number(123), CompareOp::Match, &Value::string("2")).unwrap());
    assert_eq!(
        cmp(&Value::Float(1.5), CompareOp::Match, &Value::string("1"))
            .unwrap_err()
            .code(),
        Some("E806")
    );
}

#[test]
fn nan_is_unordered() {
    let nan = Value::Float(f64::NAN);
    assert!(!cmp(&nan, CompareOp::Eq, &nan).unwrap());
    assert!(cmp(&nan, CompareOp::NotEq, &nan).unwrap());
    assert!(!cmp(&nan, CompareOp::Lt, &Value::Number(1)).unwrap());
}

#[test]
fn self_referencing_lists_compare_without_overflow() {
    let a = nums(&[1]);
    a.as_list().unwrap().push(a.clone(), "a").unwrap();
    let b = nums(&[1]);
    b.as_list().unwrap().push(b.clone(), "b").unwrap();
    assert!(values_equal(&a, &b, false));
}

proptest! {
    #[test]
    fn number_ordering_matches_i64(a in any::<i64>(), b in any::<i64>()) {
        let (x, y) = (Value::Number(a), Value::Number(b));
        prop_assert_eq!(cmp(&x, CompareOp::Lt, &y).unwrap(), a < b);
        prop_assert_eq!(cmp(&x, CompareOp::Eq, &y).unwrap(), a == b);
    }

    #[test]
    fn containers_never_coerce_in_arithmetic(n in any::<i64>()) {
        let list = Value::list(vec![Value::Number(n)]);
        let dict = Value::dict([("k", Value::Number(n))]);
        let mul_err = binary(&list, BinaryOp::Mul, &Value::Number(n)).unwrap_err();
        prop_assert_eq!(mul_err.code(), Some("E745"));
        let div_err = binary(&Value::Number(n), BinaryOp::Div, &dict).unwrap_err();
        prop_assert_eq!(div_err.code(), Some("E728"));
    }
}
