use pretty_assertions::assert_eq;
use proptest::prelude::*;

use vim_value::EvalErrorKind;

use super::*;
use crate::host::MemoryEditor;

fn call(name: &str, args: &[Value]) -> EvalResult {
    let mut interp = Interpreter::new();
    interp.call_function(name, args, &mut MemoryEditor::new())
}

fn error_code(name: &str, args: &[Value]) -> String {
    let action = call(name, args).unwrap_err();
    action.as_error().unwrap().code().unwrap().to_string()
}

fn nums(values: &[i64]) -> Value {
    Value::list(values.iter().copied().map(Value::Number).collect())
}

fn strs(values: &[&str]) -> Value {
    Value::list(values.iter().map(|s| Value::string(*s)).collect())
}

// Table

#[test]
fn table_is_sorted_and_unique() {
    let names: Vec<&str> = builtin_names().collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(names, sorted);
}

#[test]
fn lookup_finds_every_entry() {
    for name in builtin_names() {
        assert_eq!(lookup(name).unwrap().name, name);
    }
    assert!(lookup("Len").is_none());
    assert!(!is_builtin("nosuchfunction"));
}

#[test]
fn arity_bounds() {
    let len = lookup("len").unwrap();
    assert_eq!(len.check_arity(0).unwrap_err().code(), Some("E119"));
    assert_eq!(len.check_arity(2).unwrap_err().code(), Some("E118"));
    assert!(len.check_arity(1).is_ok());
}

// Collections

#[test]
fn len_of_each_type() {
    assert_eq!(call("len", &[Value::Number(-123)]).unwrap(), Value::Number(4));
    assert_eq!(call("len", &[Value::string("héllo")]).unwrap(), Value::Number(6));
    assert_eq!(call("len", &[nums(&[1, 2])]).unwrap(), Value::Number(2));
    assert_eq!(error_code("len", &[Value::Float(1.0)]), "E701");
}

#[test]
fn get_with_defaults() {
    let list = nums(&[10, 20]);
    assert_eq!(call("get", &[list.clone(), Value::Number(-1)]).unwrap(), Value::Number(20));
    assert_eq!(call("get", &[list, Value::Number(5)]).unwrap(), Value::Number(0));
    let dict = Value::dict([("a", Value::Number(1))]);
    let fallback = call("get", &[dict, Value::string("b"), Value::string("none")]).unwrap();
    assert_eq!(fallback, Value::string("none"));
}

#[test]
fn add_and_insert_modify_in_place() {
    let list = nums(&[1]);
    call("add", &[list.clone(), Value::Number(2)]).unwrap();
    call("insert", &[list.clone(), Value::Number(0)]).unwrap();
    call("insert", &[list.clone(), Value::Number(3), Value::Number(3)]).unwrap();
    assert_eq!(list, nums(&[0, 1, 2, 3]));
    assert_eq!(error_code("insert", &[list, Value::Number(9), Value::Number(9)]), "E684");
}

#[test]
fn remove_ranges_and_keys() {
    let list = nums(&[1, 2, 3, 4]);
    assert_eq!(call("remove", &[list.clone(), Value::Number(0)]).unwrap(), Value::Number(1));
    let removed = call("remove", &[list.clone(), Value::Number(0), Value::Number(1)]).unwrap();
    assert_eq!(removed, nums(&[2, 3]));
    assert_eq!(list, nums(&[4]));

    let dict = Value::dict([("a", Value::Number(1))]);
    assert_eq!(call("remove", &[dict.clone(), Value::string("a")]).unwrap(), Value::Number(1));
    assert_eq!(error_code("remove", &[dict, Value::string("a")]), "E716");
}

#[test]
fn extend_dict_modes() {
    let target = Value::dict([("a", Value::Number(1))]);
    let source = Value::dict([("a", Value::Number(2)), ("b", Value::Number(3))]);
    call("extend", &[target.clone(), source.clone(), Value::string("keep")]).unwrap();
    assert_eq!(target.as_dict().unwrap().get("a"), Some(Value::Number(1)));
    assert_eq!(target.as_dict().unwrap().get("b"), Some(Value::Number(3)));
    assert_eq!(error_code("extend", &[target.clone(), source.clone(), Value::string("error")]), "E737");
    call("extend", &[target.clone(), source]).unwrap();
    assert_eq!(target.as_dict().unwrap().get("a"), Some(Value::Number(2)));
}

#[test]
fn extend_list_at_index() {
    let target = nums(&[1, 4]);
    call("extend", &[target.clone(), nums(&[2, 3]), Value::Number(1)]).unwrap();
    assert_eq!(target, nums(&[1, 2, 3, 4]));
    assert_eq!(error_code("extend", &[target, Value::Number(1)]), "E712");
}

#[test]
fn index_is_type_strict() {
    let list = Value::list(vec![Value::string("1"), Value::Number(1)]);
    assert_eq!(call("index", &[list.clone(), Value::Number(1)]).unwrap(), Value::Number(1));
    assert_eq!(call("index", &[list, Value::Number(2)]).unwrap(), Value::Number(-1));
}

#[test]
fn range_forms() {
    assert_eq!(call("range", &[Value::Number(3)]).unwrap(), nums(&[0, 1, 2]));
    let down = call("range", &[Value::Number(5), Value::Number(1), Value::Number(-2)]).unwrap();
    assert_eq!(down, nums(&[5, 3, 1]));
    assert_eq!(call("range", &[Value::Number(0)]).unwrap(), nums(&[]));
    assert_eq!(
        error_code("range", &[Value::Number(1), Value::Number(5), Value::Number(0)]),
        "E726"
    );
    assert_eq!(error_code("range", &[Value::Number(5), Value::Number(1)]), "E727");
}

#[test]
fn max_min_of_lists_and_dicts() {
    assert_eq!(call("max", &[nums(&[3, 9, 2])]).unwrap(), Value::Number(9));
    assert_eq!(call("min", &[nums(&[])]).unwrap(), Value::Number(0));
    let dict = Value::dict([("a", Value::Number(-4)), ("b", Value::Number(7))]);
    assert_eq!(call("min", &[dict]).unwrap(), Value::Number(-4));
}

#[test]
fn sort_orders() {
    let words = strs(&["b", "A", "c"]);
    call("sort", &[words.clone()]).unwrap();
    assert_eq!(words, strs(&["A", "b", "c"]));
    call("sort", &[words.clone(), Value::string("i")]).unwrap();
    assert_eq!(words, strs(&["A", "b", "c"]));

    let numbers = nums(&[10, 9, 100]);
    call("sort", &[numbers.clone()]).unwrap();
    assert_eq!(numbers, nums(&[10, 100, 9]));
    call("sort", &[numbers.clone(), Value::string("n")]).unwrap();
    assert_eq!(numbers, nums(&[9, 10, 100]));
}

#[test]
fn sort_rejects_non_dict_self() {
    assert_eq!(error_code("sort", &[nums(&[1]), Value::string(""), Value::Number(1)]), "E715");
}

#[test]
fn reverse_in_place() {
    let list = nums(&[1, 2, 3]);
    call("reverse", &[list.clone()]).unwrap();
    assert_eq!(list, nums(&[3, 2, 1]));
}

#[test]
fn copy_is_shallow_deepcopy_is_not() {
    let inner = nums(&[1]);
    let outer = Value::list(vec![inner.clone()]);
    let shallow = call("copy", &[outer.clone()]).unwrap();
    let deep = call("deepcopy", &[outer]).unwrap();
    call("add", &[inner, Value::Number(2)]).unwrap();
    assert_eq!(shallow.to_string_repr(), "[[1, 2]]");
    assert_eq!(deep.to_string_repr(), "[[1]]");
}

#[test]
fn map_passes_key_and_value() {
    let mut interp = Interpreter::new();
    let mut ctx = MemoryEditor::new();
    let names = Value::dict([("0", Value::string("zero"))]);
    let lookup_or_keep = interp
        .call_function(
            "function",
            &[Value::string("get"), Value::list(vec![names])],
            &mut ctx,
        )
        .unwrap();
    let list = strs(&["a", "b"]);
    interp
        .call_function("map", &[list.clone(), lookup_or_keep.clone()], &mut ctx)
        .unwrap();
    assert_eq!(list, strs(&["zero", "b"]));
    assert_eq!(error_code("map", &[Value::Number(1), lookup_or_keep]), "E896");
}

#[test]
fn expression_strings_need_a_parser() {
    let action = call("map", &[nums(&[1]), Value::string("v:val * 2")]).unwrap_err();
    let err = action.as_error().unwrap();
    assert!(matches!(err.kind, EvalErrorKind::NotImplemented { .. }));
}

// Conversions and strings

#[test]
fn type_codes() {
    assert_eq!(call("type", &[Value::Number(1)]).unwrap(), Value::Number(0));
    assert_eq!(call("type", &[Value::string("")]).unwrap(), Value::Number(1));
    assert_eq!(call("type", &[nums(&[])]).unwrap(), Value::Number(3));
    assert_eq!(call("type", &[Value::Float(0.5)]).unwrap(), Value::Number(5));
}

#[test]
fn string_quotes_nested_values() {
    let value = Value::list(vec![Value::string("it's"), Value::Number(1)]);
    assert_eq!(call("string", &[value]).unwrap(), Value::string("['it''s', 1]"));
}

#[test]
fn str2nr_bases() {
    assert_eq!(call("str2nr", &[Value::string("  42abc")]).unwrap(), Value::Number(42));
    assert_eq!(call("str2nr", &[Value::string("0x1F")]).unwrap(), Value::Number(0));
    let hex = call("str2nr", &[Value::string("0x1F"), Value::Number(16)]).unwrap();
    assert_eq!(hex, Value::Number(31));
    let quoted = call(
        "str2nr",
        &[Value::string("1'000"), Value::Number(10), Value::Number(1)],
    )
    .unwrap();
    assert_eq!(quoted, Value::Number(1000));
    assert_eq!(error_code("str2nr", &[Value::string("1"), Value::Number(7)]), "E475");
}

#[test]
fn float_conversions() {
    assert_eq!(call("str2float", &[Value::string("1.5e1")]).unwrap(), Value::Float(15.0));
    assert_eq!(call("float2nr", &[Value::Float(-3.7)]).unwrap(), Value::Number(-3));
    assert_eq!(error_code("float2nr", &[Value::string("1")]), "E808");
    assert_eq!(call("abs", &[Value::Number(i64::MIN)]).unwrap(), Value::Number(i64::MAX));
    assert_eq!(call("abs", &[Value::Float(-0.5)]).unwrap(), Value::Float(0.5));
}

#[test]
fn string_helpers() {
    let joined = call("join", &[Value::list(vec![Value::string("a"), nums(&[1])]), Value::string("-")]);
    assert_eq!(joined.unwrap(), Value::string("a-[1]"));
    assert_eq!(call("join", &[strs(&["x", "y"])]).unwrap(), Value::string("x y"));
    assert_eq!(call("repeat", &[Value::string("ab"), Value::Number(3)]).unwrap(), Value::string("ababab"));
    assert_eq!(call("repeat", &[nums(&[1]), Value::Number(2)]).unwrap(), nums(&[1, 1]));
    assert_eq!(call("repeat", &[Value::string("x"), Value::Number(-1)]).unwrap(), Value::string(""));
    assert_eq!(call("strlen", &[Value::Number(100)]).unwrap(), Value::Number(3));
    assert_eq!(call("toupper", &[Value::string("abc")]).unwrap(), Value::string("ABC"));
    assert_eq!(call("tolower", &[Value::string("ÀB")]).unwrap(), Value::string("àb"));
}

#[test]
fn stridx_offsets() {
    let hay = Value::string("abcabc");
    assert_eq!(call("stridx", &[hay.clone(), Value::string("c")]).unwrap(), Value::Number(2));
    let from = call("stridx", &[hay.clone(), Value::string("c"), Value::Number(3)]).unwrap();
    assert_eq!(from, Value::Number(5));
    let past = call("stridx", &[hay, Value::string("a"), Value::Number(6)]).unwrap();
    assert_eq!(past, Value::Number(-1));
}

// Functions and variables

#[test]
fn function_of_builtin_and_partials() {
    let mut interp = Interpreter::new();
    let mut ctx = MemoryEditor::new();
    let partial = interp
        .call_function("function", &[Value::string("add"), Value::list(vec![nums(&[1])])], &mut ctx)
        .unwrap();
    let Value::Funcref(funcref) = &partial else {
        panic!("expected a funcref");
    };
    assert_eq!(funcref.name(), "add");
    let result = interp.call_function(funcref.as_ref(), &[Value::Number(2)], &mut ctx).unwrap();
    assert_eq!(result, nums(&[1, 2]));
}

#[test]
fn function_argument_errors() {
    assert_eq!(error_code("function", &[Value::string("NoSuch")]), "E700");
    assert_eq!(error_code("function", &[Value::Number(1)]), "E718");
    assert_eq!(error_code("function", &[Value::string("len"), Value::Number(1)]), "E923");
    assert_eq!(
        error_code("function", &[Value::string("len"), nums(&[]), Value::Number(1)]),
        "E922"
    );
}

#[test]
fn call_with_argument_list() {
    let result = call("call", &[Value::string("max"), Value::list(vec![nums(&[4, 8])])]).unwrap();
    assert_eq!(result, Value::Number(8));
    assert_eq!(error_code("call", &[Value::string("max"), Value::Number(1)]), "E714");
    assert_eq!(
        error_code("call", &[Value::string("max"), nums(&[]), Value::Number(1)]),
        "E922"
    );
}

#[test]
fn exists_variables_and_functions() {
    let mut interp = Interpreter::new();
    let mut ctx = MemoryEditor::new();
    interp.set_global("present", Value::Number(1));
    let mut exists = |text: &str| {
        interp
            .call_function("exists", &[Value::string(text)], &mut ctx)
            .unwrap()
    };
    assert_eq!(exists("present"), Value::Number(1));
    assert_eq!(exists("g:present"), Value::Number(1));
    assert_eq!(exists("absent"), Value::Number(0));
    assert_eq!(exists("*len"), Value::Number(1));
    assert_eq!(exists("*NoSuch"), Value::Number(0));
    assert_eq!(exists("$VIM_EVAL_UNSET_VARIABLE"), Value::Number(0));
    assert_eq!(exists(""), Value::Number(0));
}

#[test]
fn islocked_variables() {
    let mut interp = Interpreter::new();
    let mut ctx = MemoryEditor::new();
    interp.set_global("plain", Value::Number(1));
    let locked = nums(&[1]);
    locked.lock(1);
    interp.set_global("frozen", locked);
    let mut islocked = |text: &str| {
        interp
            .call_function("islocked", &[Value::string(text)], &mut ctx)
            .unwrap()
    };
    assert_eq!(islocked("plain"), Value::Number(0));
    assert_eq!(islocked("g:frozen"), Value::Number(1));
    assert_eq!(islocked("missing"), Value::Number(-1));
}

proptest! {
    #[test]
    fn arity_errors_ignore_argument_contents(n in any::<i64>(), s in ".*") {
        let args = [Value::Number(n), Value::string(s.as_str()), Value::Float(0.0)];
        prop_assert_eq!(error_code("len", &args[..2]), "E118");
        prop_assert_eq!(error_code("strlen", &[]), "E119");
        prop_assert_eq!(error_code("repeat", &args[..1]), "E119");
        prop_assert_eq!(error_code("abs", &args), "E118");
    }
}
