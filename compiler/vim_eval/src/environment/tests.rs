use std::rc::Rc;

use pretty_assertions::assert_eq;
use vim_ir::{Expr, FunctionDecl, LambdaExpr};

use super::*;

fn function(name: &str, closure: Option<Rc<ClosureScope>>) -> Rc<UserFunction> {
    let decl = Rc::new(FunctionDecl::new("F", &[], vec![]));
    Rc::new(UserFunction::new(name, decl, ScriptId(3), closure))
}

fn lambda(closure: Option<Rc<ClosureScope>>) -> Rc<UserFunction> {
    let decl = LambdaExpr::new(vec!["x".into()], false, Expr::Number(0)).decl;
    Rc::new(UserFunction::new("<lambda>1", decl, ScriptId(3), closure))
}

#[test]
fn top_level_reads_globals() {
    let env = Environment::new();
    env.globals().define("x", Value::Number(1));
    assert_eq!(env.lookup("x"), Some(Value::Number(1)));
    assert_eq!(env.lookup("y"), None);
    assert!(env.frame().is_none());
}

#[test]
fn function_reads_locals_not_globals() {
    let mut env = Environment::new();
    env.globals().define("x", Value::Number(1));
    let frame = Frame::new(function("F", None));
    frame.locals.define("y", Value::Number(2));
    env.push_frame(frame);
    assert_eq!(env.lookup("x"), None);
    assert_eq!(env.lookup("y"), Some(Value::Number(2)));
    env.pop_frame();
    assert_eq!(env.lookup("x"), Some(Value::Number(1)));
}

#[test]
fn compat_vim_names_are_visible_everywhere() {
    let mut env = Environment::new();
    assert_eq!(env.lookup("version"), Some(Value::Number(VIM_VERSION)));
    env.push_frame(Frame::new(function("F", None)));
    assert_eq!(env.lookup("count"), Some(Value::Number(0)));
    assert_eq!(env.lookup("t_list"), None);
}

#[test]
fn lambda_sees_own_args_and_captured_scopes() {
    let mut env = Environment::new();
    let outer = Frame::new(function("Outer", None));
    outer.locals.define("total", Value::Number(10));
    outer.args.define("step", Value::Number(2));
    let captured = outer.capture();

    let inner = Frame::new(lambda(Some(captured)));
    inner.args.define("x", Value::Number(5));
    env.push_frame(inner);
    assert_eq!(env.lookup("x"), Some(Value::Number(5)));
    assert_eq!(env.lookup("total"), Some(Value::Number(10)));
    assert_eq!(env.lookup("step"), Some(Value::Number(2)));
}

#[test]
fn plain_function_args_need_prefix() {
    let mut env = Environment::new();
    let frame = Frame::new(function("F", None));
    frame.args.define("x", Value::Number(5));
    env.push_frame(frame);
    assert_eq!(env.lookup("x"), None);
}

#[test]
fn closure_assignment_reaches_outer_variable() {
    let mut env = Environment::new();
    let outer = Frame::new(function("Outer", None));
    outer.locals.define("count", Value::Number(0));
    let outer_locals = outer.locals.clone();
    env.push_frame(Frame::new(function("Inner", Some(outer.capture()))));
    assert!(env.assign_target("count").ptr_eq(&outer_locals));
    let own = env.assign_target("fresh");
    assert!(own.ptr_eq(&env.frame().unwrap().locals));
}

#[test]
fn top_level_assigns_globals() {
    let env = Environment::new();
    assert!(env.assign_target("x").ptr_eq(env.globals()));
}

#[test]
fn explicit_scopes() {
    let mut env = Environment::new();
    assert!(matches!(env.scope(VarScope::Local), ScopeLookup::NoFunction));
    assert!(matches!(env.scope(VarScope::Buffer), ScopeLookup::Host));
    let ScopeLookup::Dict(globals) = env.scope(VarScope::Global) else {
        panic!("g: is a dictionary");
    };
    assert!(globals.ptr_eq(env.globals()));

    env.push_frame(Frame::new(function("F", None)));
    assert!(matches!(env.scope(VarScope::Argument), ScopeLookup::Dict(_)));
}

#[test]
fn script_scope_follows_running_function() {
    let mut env = Environment::new();
    let top = env.script_vars(ScriptId(0));
    let ScopeLookup::Dict(s) = env.scope(VarScope::Script) else {
        panic!("s: is a dictionary");
    };
    assert!(s.ptr_eq(&top));

    env.push_frame(Frame::new(function("F", None)));
    assert_eq!(env.current_script(), ScriptId(3));
    let ScopeLookup::Dict(s) = env.scope(VarScope::Script) else {
        panic!("s: is a dictionary");
    };
    assert!(!s.ptr_eq(&top));
}

#[test]
fn entering_a_script_returns_previous() {
    let mut env = Environment::new();
    assert_eq!(env.enter_script(ScriptId(7)), ScriptId(0));
    assert_eq!(env.current_script(), ScriptId(7));
    assert_eq!(env.enter_script(ScriptId(0)), ScriptId(7));
}

#[test]
fn writable_vim_vars() {
    assert!(Environment::is_writable_vim_var("errmsg"));
    assert!(!Environment::is_writable_vim_var("version"));
}
