use pretty_assertions::assert_eq;

use super::*;

#[test]
fn var_ref_parses_scope_prefix() {
    assert_eq!(
        VarRef::parse("g:name"),
        VarRef::scoped(VarScope::Global, "name")
    );
    assert_eq!(
        VarRef::parse("a:000"),
        VarRef::scoped(VarScope::Argument, "000")
    );
    assert_eq!(VarRef::parse("count"), VarRef::unscoped("count"));
    // `x:` is not a scope letter.
    assert_eq!(VarRef::parse("x:y"), VarRef::unscoped("x:y"));
}

#[test]
fn var_ref_display_round_trips_prefix() {
    assert_eq!(VarRef::parse("s:cache").to_string(), "s:cache");
    assert_eq!(VarRef::parse("plain").to_string(), "plain");
}

#[test]
fn case_mode_resolution() {
    assert!(CaseMode::Default.ignores_case(true));
    assert!(!CaseMode::Default.ignores_case(false));
    assert!(!CaseMode::MatchCase.ignores_case(true));
    assert!(CaseMode::IgnoreCase.ignores_case(false));
}

#[test]
fn compound_assign_maps_to_binary_op() {
    assert_eq!(AssignOp::Assign.binary_op(), None);
    assert_eq!(AssignOp::Concat.binary_op(), Some(BinaryOp::Concat));
    assert_eq!(AssignOp::Mod.binary_op(), Some(BinaryOp::Mod));
}

#[test]
fn declaration_arity() {
    let mut decl = FunctionDecl::new("Foo", &["a", "b"], vec![]);
    decl.params.push(Param::optional("c", Expr::Number(1)));
    assert_eq!(decl.required_params(), 2);
    assert_eq!(decl.max_params(), Some(3));
    assert_eq!(decl.with_varargs().max_params(), None);
}

#[test]
fn lambda_wraps_body_in_return() {
    let lambda = LambdaExpr::new(vec!["x".into()], false, Expr::var("x"));
    assert!(lambda.decl.flags.contains(FunctionFlags::CLOSURE));
    assert_eq!(lambda.decl.body.len(), 1);
    assert_eq!(
        lambda.decl.body[0].kind,
        StmtKind::Return(Some(Expr::var("x")))
    );
}

#[test]
fn only_equality_ops_apply_to_containers() {
    assert!(CompareOp::Is.is_equality());
    assert!(CompareOp::NotEq.is_equality());
    assert!(!CompareOp::Lt.is_equality());
    assert!(!CompareOp::Match.is_equality());
}
