//! Builtins about functions and variables: `function()`, `funcref()`,
//! `call()`, `eval()`, `exists()` and `islocked()`.

use std::rc::Rc;

use vim_ir::{Expr, OptionScope, VarRef};
use vim_value::errors::{
    dict_required, expected_dict, funcref_required, invalid_argument, key_not_present,
    list_index_out_of_range, list_required, not_implemented, partial_argument_type,
    unknown_function_name,
};
use vim_value::{
    DictHandle, EvalError, EvalResult, FuncrefKind, FuncrefValue, FunctionHandle, Value,
};

use super::lookup;
use crate::host::EditorContext;
use crate::interpreter::{is_plain_lookup, Interpreter};

/// `function({name} [, {arglist}] [, {dict}])`
///
/// The result looks its function up by name on every call.
pub(super) fn function(
    interp: &mut Interpreter,
    args: &[Value],
    _: &mut dyn EditorContext,
) -> EvalResult {
    Ok(Value::funcref(make_funcref(interp, args, FuncrefKind::Function)?))
}

/// `funcref({name} [, {arglist}] [, {dict}])`
///
/// The result keeps calling the function it was created from, even after
/// the name is redefined.
pub(super) fn funcref(
    interp: &mut Interpreter,
    args: &[Value],
    _: &mut dyn EditorContext,
) -> EvalResult {
    Ok(Value::funcref(make_funcref(interp, args, FuncrefKind::Funcref)?))
}

fn make_funcref(
    interp: &Interpreter,
    args: &[Value],
    kind: FuncrefKind,
) -> Result<FuncrefValue, EvalError> {
    let mut funcref = match &args[0] {
        Value::Funcref(existing) => FuncrefValue::clone(existing),
        Value::String(name) => FuncrefValue::new(function_handle(interp, name)?, kind),
        _ => return Err(funcref_required()),
    };

    let (arguments, dict) = match (args.get(1), args.get(2)) {
        (None, _) => (None, None),
        (Some(Value::List(list)), None) => (Some(list), None),
        (Some(Value::Dict(dict)), None) => (None, Some(dict)),
        (Some(Value::List(list)), Some(Value::Dict(dict))) => (Some(list), Some(dict)),
        (Some(Value::List(_)), Some(_)) => return Err(expected_dict()),
        (Some(_), _) => return Err(partial_argument_type()),
    };
    if let Some(list) = arguments {
        funcref.arguments.extend(list.items());
    }
    if let Some(dict) = dict {
        funcref.dict = Some(dict.clone());
    }
    Ok(funcref)
}

/// The function a name given to `function()` refers to: a builtin when the
/// name carries no scope, otherwise a user function.
fn function_handle(interp: &Interpreter, name: &str) -> Result<FunctionHandle, EvalError> {
    let var = VarRef::parse(name);
    if var.scope.is_none() {
        if let Some(builtin) = lookup(&var.name) {
            return Ok(FunctionHandle::Builtin(builtin.name));
        }
    }
    interp
        .find_function(&var)
        .map(FunctionHandle::User)
        .ok_or_else(|| unknown_function_name(name))
}

/// `call({func}, {arglist} [, {dict}])`
pub(super) fn call(
    interp: &mut Interpreter,
    args: &[Value],
    ctx: &mut dyn EditorContext,
) -> EvalResult {
    let Value::List(list) = &args[1] else {
        return Err(list_required().into());
    };
    let dict = match args.get(2) {
        Some(Value::Dict(dict)) => Some(dict.clone()),
        Some(_) => return Err(expected_dict().into()),
        None => None,
    };
    let funcref = match &args[0] {
        Value::Funcref(funcref) => Rc::clone(funcref),
        Value::String(name) => interp.resolve_named(&VarRef::parse(name), ctx)?,
        _ => return Err(funcref_required().into()),
    };
    let funcref = match dict {
        Some(dict) => Rc::new(funcref.bind_dict(dict)),
        None => funcref,
    };
    interp.call_funcref(&funcref, &list.items(), None, ctx)
}

/// `eval({string})`
pub(super) fn eval(
    interp: &mut Interpreter,
    args: &[Value],
    ctx: &mut dyn EditorContext,
) -> EvalResult {
    let text = args[0].as_string()?;
    let expr = parse(interp, &text)?;
    interp.eval_expr(&expr, ctx)
}

fn parse(interp: &Interpreter, text: &str) -> Result<Expr, EvalError> {
    interp
        .parser
        .as_ref()
        .ok_or_else(|| not_implemented("eval() without an expression parser"))?
        .parse_expression(text)
}

/// `exists({expr})`
///
/// `&opt` and `+opt` ask the editor for an option, `$NAME` for an
/// environment variable, `*Name` for a function. Anything else is a
/// variable, optionally followed by literal `[index]` or `.key` lookups.
pub(super) fn exists(
    interp: &mut Interpreter,
    args: &[Value],
    ctx: &mut dyn EditorContext,
) -> EvalResult {
    let text = args[0].as_string()?;
    let text = text.trim();
    let found = match text.chars().next() {
        Some('&' | '+') => {
            let (name, scope) = option_name(&text[1..]);
            ctx.option(name, scope).is_some()
        }
        Some('$') => ctx.env_var(&text[1..]).is_some(),
        Some('*') => function_exists(interp, &text[1..]),
        Some(':') => return Err(not_implemented("exists() for Ex commands").into()),
        Some('#') => return Err(not_implemented("exists() for autocommands").into()),
        Some(_) => variable_exists(interp, text, ctx),
        None => false,
    };
    Ok(Value::bool(found))
}

fn option_name(text: &str) -> (&str, OptionScope) {
    if let Some(name) = text.strip_prefix("g:") {
        (name, OptionScope::Global)
    } else if let Some(name) = text.strip_prefix("l:") {
        (name, OptionScope::Local)
    } else {
        (text, OptionScope::Effective)
    }
}

fn function_exists(interp: &Interpreter, name: &str) -> bool {
    let var = VarRef::parse(name);
    (var.scope.is_none() && lookup(&var.name).is_some()) || interp.find_function(&var).is_some()
}

fn variable_exists(interp: &mut Interpreter, text: &str, ctx: &mut dyn EditorContext) -> bool {
    let expr = if interp.parser.is_some() {
        match parse(interp, text) {
            Ok(expr) if is_plain_lookup(&expr) => expr,
            _ => return false,
        }
    } else {
        Expr::Var(VarRef::parse(text))
    };
    match &expr {
        Expr::Var(var) => matches!(interp.lookup_var(var, ctx), Ok(Some(_))),
        _ => interp.eval_expr(&expr, ctx).is_ok(),
    }
}

/// `islocked({expr})`: 1 when the variable or item cannot be changed, -1
/// when the variable does not exist.
pub(super) fn islocked(
    interp: &mut Interpreter,
    args: &[Value],
    ctx: &mut dyn EditorContext,
) -> EvalResult {
    let text = args[0].as_string()?;
    let expr = if interp.parser.is_some() {
        parse(interp, &text)?
    } else {
        Expr::Var(VarRef::parse(&text))
    };
    match &expr {
        Expr::Var(var) => {
            let dict = variable_scope(interp, var, ctx)?;
            Ok(dict
                .get(&var.name)
                .map_or(Value::Number(-1), |value| {
                    Value::bool(dict.is_key_locked(&var.name) || value.is_locked())
                }))
        }
        Expr::DictKey { base, key } => {
            let Value::Dict(dict) = interp.eval_expr(base, ctx)? else {
                return Err(dict_required().into());
            };
            Ok(Value::bool(key_locked(&dict, key)?))
        }
        Expr::Index { base, index } => {
            let container = interp.eval_expr(base, ctx)?;
            let index = interp.eval_expr(index, ctx)?;
            match &container {
                Value::List(list) => {
                    let n = index.as_number()?;
                    let item = list
                        .resolve_index(n)
                        .and_then(|i| list.get(i))
                        .ok_or_else(|| list_index_out_of_range(n))?;
                    Ok(Value::bool(list.items_locked() || item.is_locked()))
                }
                Value::Dict(dict) => Ok(Value::bool(key_locked(dict, &index.as_string()?)?)),
                _ => Err(invalid_argument(&text).into()),
            }
        }
        _ => Err(invalid_argument(&text).into()),
    }
}

/// Dictionary holding `var`, where an unscoped name is looked for where an
/// assignment would put it.
fn variable_scope(
    interp: &mut Interpreter,
    var: &VarRef,
    ctx: &mut dyn EditorContext,
) -> Result<DictHandle, EvalError> {
    match var.scope {
        None => Ok(interp.env.assign_target(&var.name)),
        Some(scope) => interp.scope_dict(scope, &var.to_string(), ctx),
    }
}

fn key_locked(dict: &DictHandle, key: &str) -> Result<bool, EvalError> {
    let value = dict.get(key).ok_or_else(|| key_not_present(key))?;
    Ok(dict.items_locked() || dict.is_key_locked(key) || value.is_locked())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_prefixes() {
        assert_eq!(option_name("tabstop"), ("tabstop", OptionScope::Effective));
        assert_eq!(option_name("g:tabstop"), ("tabstop", OptionScope::Global));
        assert_eq!(option_name("l:tabstop"), ("tabstop", OptionScope::Local));
    }

    #[test]
    fn scoped_names_never_resolve_to_builtins() {
        let interp = Interpreter::new();
        assert!(function_exists(&interp, "len"));
        assert!(!function_exists(&interp, "g:len"));
        assert!(!function_exists(&interp, "Missing"));
        assert!(matches!(
            function_handle(&interp, "len"),
            Ok(FunctionHandle::Builtin("len"))
        ));
        assert!(function_handle(&interp, "s:len").is_err());
    }
}
