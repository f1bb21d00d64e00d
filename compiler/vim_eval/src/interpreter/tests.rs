use std::sync::Arc;

use pretty_assertions::assert_eq;
use vim_ir::{
    AssignOp, BinaryOp, CatchClause, EchoKind, FunctionFlags, FunctionTarget, IfBranch, LetTarget,
    StmtKind, VarRef, LOCK_DEPTH_DEFAULT,
};

use super::*;
use crate::host::MemoryEditor;
use crate::output::buffer_handler;

struct Session {
    interp: Interpreter,
    output: SharedOutputHandler,
    editor: MemoryEditor,
}

impl Session {
    fn new() -> Self {
        let output = buffer_handler();
        Session {
            interp: Interpreter::builder().output(Arc::clone(&output)).build(),
            output,
            editor: MemoryEditor::with_lines(["first", "second", "third"]),
        }
    }

    fn run(&mut self, stmts: Vec<Stmt>) -> ExecutionResult {
        self.interp.execute(&stmts, &mut self.editor)
    }

    fn error_code(&mut self, stmts: Vec<Stmt>) -> String {
        let result = self.run(stmts);
        result.error().unwrap().code().unwrap().to_string()
    }

    fn source(&mut self, name: &str, stmts: Vec<Stmt>) {
        self.interp
            .run_script(&Script::new(name, stmts), &mut self.editor);
    }

    fn global(&self, name: &str) -> Value {
        self.interp.global(name).unwrap()
    }
}

fn stmt(kind: StmtKind) -> Stmt {
    Stmt::generated(kind)
}

fn let_(name: &str, value: Expr) -> Stmt {
    let_op(name, AssignOp::Assign, value)
}

fn let_op(name: &str, op: AssignOp, value: Expr) -> Stmt {
    stmt(StmtKind::Let {
        target: LetTarget::var(name),
        op,
        value,
        is_const: false,
    })
}

fn const_(name: &str, value: Expr) -> Stmt {
    stmt(StmtKind::Let {
        target: LetTarget::var(name),
        op: AssignOp::Assign,
        value,
        is_const: true,
    })
}

fn echo(args: Vec<Expr>) -> Stmt {
    stmt(StmtKind::Echo {
        kind: EchoKind::Echo,
        args,
    })
}

fn call(name: &str, args: Vec<Expr>) -> Stmt {
    stmt(StmtKind::Call {
        expr: Expr::call(name, args),
        range: None,
    })
}

fn list(items: &[i64]) -> Expr {
    Expr::List(items.iter().copied().map(Expr::Number).collect())
}

fn function(decl: FunctionDecl) -> Stmt {
    stmt(StmtKind::Function(Rc::new(decl)))
}

fn ret(expr: Expr) -> Stmt {
    stmt(StmtKind::Return(Some(expr)))
}

fn var(name: &str) -> Expr {
    Expr::var(name)
}

// Variables

#[test]
fn let_and_compound_assignment() {
    let mut s = Session::new();
    let result = s.run(vec![
        let_("x", Expr::Number(1)),
        let_op("x", AssignOp::Add, Expr::Number(2)),
        let_op("x", AssignOp::Concat, Expr::string("!")),
    ]);
    assert!(result.is_success());
    assert_eq!(s.global("x"), Value::string("3!"));
}

#[test]
fn const_locks_the_variable() {
    let mut s = Session::new();
    assert_eq!(
        s.error_code(vec![
            const_("limit", list(&[1])),
            let_("limit", Expr::Number(2)),
        ]),
        "E741"
    );
    assert_eq!(s.error_code(vec![const_("limit", Expr::Number(3))]), "E995");
    assert_eq!(
        s.error_code(vec![call("add", vec![var("limit"), Expr::Number(2)])]),
        "E741"
    );
}

#[test]
fn unlet_missing_variable() {
    let mut s = Session::new();
    let unlet = |force| {
        stmt(StmtKind::Unlet {
            targets: vec![LetTarget::var("nothing")],
            force,
        })
    };
    assert_eq!(s.error_code(vec![unlet(false)]), "E108");
    assert!(s.run(vec![unlet(true)]).is_success());
}

#[test]
fn unlet_list_item_and_dict_key() {
    let mut s = Session::new();
    let dict = Expr::Dict(vec![
        (Expr::string("a"), Expr::Number(1)),
        (Expr::string("b"), Expr::Number(2)),
    ]);
    let result = s.run(vec![
        let_("l", list(&[1, 2, 3])),
        let_("d", dict),
        stmt(StmtKind::Unlet {
            targets: vec![
                LetTarget::Index {
                    base: var("l"),
                    index: Expr::Number(-1),
                },
                LetTarget::DictKey {
                    base: var("d"),
                    key: "a".to_string(),
                },
            ],
            force: false,
        }),
    ]);
    assert!(result.is_success());
    assert_eq!(s.global("l").to_string_repr(), "[1, 2]");
    assert_eq!(s.global("d").to_string_repr(), "{'b': 2}");
}

#[test]
fn lockvar_and_unlockvar() {
    let mut s = Session::new();
    let lock = |unlock| {
        stmt(StmtKind::LockVar {
            targets: vec![LetTarget::var("l")],
            depth: LOCK_DEPTH_DEFAULT,
            unlock,
        })
    };
    let add = || call("add", vec![var("l"), Expr::Number(9)]);
    assert!(s.run(vec![let_("l", list(&[1])), lock(false)]).is_success());
    assert_eq!(s.error_code(vec![add()]), "E741");
    assert_eq!(s.error_code(vec![let_("l", Expr::Number(0))]), "E741");
    assert!(s.run(vec![lock(true), add()]).is_success());
    assert_eq!(s.global("l").to_string_repr(), "[1, 9]");
}

#[test]
fn locked_value_blocks_assignment_through_an_alias() {
    let mut s = Session::new();
    let lock = |unlock| {
        stmt(StmtKind::LockVar {
            targets: vec![LetTarget::var("g:l")],
            depth: LOCK_DEPTH_DEFAULT,
            unlock,
        })
    };
    assert!(s
        .run(vec![
            let_("g:l", list(&[1])),
            let_("g:a", var("g:l")),
            lock(false),
        ])
        .is_success());
    assert_eq!(s.error_code(vec![let_("g:a", Expr::Number(5))]), "E741");
    assert_eq!(
        s.error_code(vec![let_op("g:a", AssignOp::Add, list(&[2]))]),
        "E741"
    );
    assert_eq!(s.global("a").to_string_repr(), "[1]");
    assert!(s.run(vec![lock(true), let_("g:a", Expr::Number(5))]).is_success());
    assert_eq!(s.global("a"), Value::Number(5));
}

#[test]
fn locked_dict_member_blocks_assignment() {
    let mut s = Session::new();
    let inner = Value::list(vec![Value::Number(1)]);
    inner.lock(1);
    let outer = DictHandle::new();
    outer.define("items", inner);
    s.interp.set_global("d", Value::Dict(outer));
    let assign_member = stmt(StmtKind::Let {
        target: LetTarget::DictKey {
            base: var("d"),
            key: "items".to_string(),
        },
        op: AssignOp::Assign,
        value: Expr::Number(0),
        is_const: false,
    });
    assert_eq!(s.error_code(vec![assign_member]), "E741");
}

#[test]
fn unpack_target_counts() {
    let mut s = Session::new();
    let unpack = |names: &[&str], rest: Option<&str>| {
        stmt(StmtKind::Let {
            target: LetTarget::Unpack {
                targets: names.iter().map(|n| LetTarget::var(n)).collect(),
                rest: rest.map(|r| Box::new(LetTarget::var(r))),
            },
            op: AssignOp::Assign,
            value: list(&[1, 2, 3]),
            is_const: false,
        })
    };
    assert!(s.run(vec![unpack(&["a", "b"], Some("rest"))]).is_success());
    assert_eq!(s.global("b"), Value::Number(2));
    assert_eq!(s.global("rest").to_string_repr(), "[3]");
    assert_eq!(s.error_code(vec![unpack(&["a", "b"], None)]), "E687");
    assert_eq!(s.error_code(vec![unpack(&["a", "b", "c", "d"], None)]), "E688");
}

// Control flow

#[test]
fn if_elseif_else() {
    let mut s = Session::new();
    let branch = |n| {
        stmt(StmtKind::If {
            branches: vec![
                IfBranch {
                    condition: Expr::binary(var("n"), BinaryOp::Sub, Expr::Number(1)),
                    body: vec![echo(vec![Expr::string("not one")])],
                },
                IfBranch {
                    condition: Expr::Number(n),
                    body: vec![echo(vec![Expr::string("second")])],
                },
            ],
            else_body: Some(vec![echo(vec![Expr::string("else")])]),
        })
    };
    s.run(vec![let_("n", Expr::Number(1)), branch(1), branch(0)]);
    assert_eq!(s.output.get_output(), "second\nelse\n");
}

#[test]
fn while_with_break_and_continue() {
    let mut s = Session::new();
    let body = vec![
        let_op("i", AssignOp::Add, Expr::Number(1)),
        stmt(StmtKind::If {
            branches: vec![IfBranch {
                condition: Expr::binary(var("i"), BinaryOp::Mod, Expr::Number(2)),
                body: vec![stmt(StmtKind::Continue)],
            }],
            else_body: None,
        }),
        stmt(StmtKind::If {
            branches: vec![IfBranch {
                condition: Expr::binary(
                    var("i"),
                    BinaryOp::compare(vim_ir::CompareOp::GtEq),
                    Expr::Number(6),
                ),
                body: vec![stmt(StmtKind::Break)],
            }],
            else_body: None,
        }),
        echo(vec![var("i")]),
    ];
    s.run(vec![
        let_("i", Expr::Number(0)),
        stmt(StmtKind::While {
            condition: Expr::Number(1),
            body,
        }),
    ]);
    assert_eq!(s.output.get_output(), "2\n4\n");
}

#[test]
fn for_over_string_characters() {
    let mut s = Session::new();
    s.run(vec![stmt(StmtKind::For {
        target: VarRef::parse("c"),
        iterable: Expr::string("hé!"),
        body: vec![stmt(StmtKind::Echo {
            kind: EchoKind::Echon,
            args: vec![var("c"), Expr::string("|")],
        })],
    })]);
    assert_eq!(s.output.get_output(), "h|é|!|");
}

#[test]
fn for_sees_items_appended_by_the_body() {
    let mut s = Session::new();
    let grow = stmt(StmtKind::If {
        branches: vec![IfBranch {
            condition: Expr::binary(
                var("x"),
                BinaryOp::compare(vim_ir::CompareOp::Lt),
                Expr::Number(3),
            ),
            body: vec![call(
                "add",
                vec![
                    var("l"),
                    Expr::binary(var("x"), BinaryOp::Add, Expr::Number(1)),
                ],
            )],
        }],
        else_body: None,
    });
    s.run(vec![
        let_("l", list(&[1])),
        stmt(StmtKind::For {
            target: VarRef::parse("x"),
            iterable: var("l"),
            body: vec![grow],
        }),
    ]);
    assert_eq!(s.global("l").to_string_repr(), "[1, 2, 3]");
}

#[test]
fn for_unpack_requires_matching_lengths() {
    let mut s = Session::new();
    let pairs = Expr::List(vec![list(&[1, 2]), list(&[3])]);
    let code = s.error_code(vec![stmt(StmtKind::ForUnpack {
        targets: vec![VarRef::parse("a"), VarRef::parse("b")],
        iterable: pairs,
        body: vec![echo(vec![var("a"), var("b")])],
    })]);
    assert_eq!(code, "E688");
    assert_eq!(s.output.get_output(), "1 2\n");
}

#[test]
fn for_unpack_with_too_few_targets() {
    let mut s = Session::new();
    let triples = Expr::List(vec![list(&[1, 2, 3])]);
    let code = s.error_code(vec![stmt(StmtKind::ForUnpack {
        targets: vec![VarRef::parse("a"), VarRef::parse("b")],
        iterable: triples,
        body: vec![echo(vec![var("a")])],
    })]);
    assert_eq!(code, "E684");
    assert_eq!(s.output.get_output(), "");
}

#[test]
fn for_rebinds_over_locked_items() {
    let mut s = Session::new();
    let first = Value::list(vec![Value::Number(1)]);
    let second = Value::list(vec![Value::Number(2)]);
    first.lock(2);
    second.lock(2);
    s.interp.set_global("items", Value::list(vec![first, second]));
    let result = s.run(vec![stmt(StmtKind::For {
        target: VarRef::parse("item"),
        iterable: var("items"),
        body: vec![echo(vec![var("item")])],
    })]);
    assert!(result.is_success());
    assert_eq!(s.output.get_output(), "[1]\n[2]\n");
}

#[test]
fn for_rejects_numbers() {
    let mut s = Session::new();
    let code = s.error_code(vec![stmt(StmtKind::For {
        target: VarRef::parse("x"),
        iterable: Expr::Number(3),
        body: Vec::new(),
    })]);
    assert_eq!(code, "E1098");
}

// Exceptions

fn try_catch(body: Vec<Stmt>, pattern: Option<&str>, catch_body: Vec<Stmt>) -> Stmt {
    stmt(StmtKind::Try {
        body,
        catches: vec![CatchClause {
            pattern: pattern.map(str::to_string),
            body: catch_body,
            span: Span::DUMMY,
        }],
        finally: Some(vec![echo(vec![Expr::string("finally")])]),
    })
}

#[test]
fn catch_sets_and_clears_exception() {
    let mut s = Session::new();
    let result = s.run(vec![
        try_catch(
            vec![echo(vec![var("undefined_thing")])],
            Some("E121"),
            vec![echo(vec![Expr::Var(VarRef::parse("v:exception"))])],
        ),
        echo(vec![Expr::Var(VarRef::parse("v:exception"))]),
    ]);
    assert!(result.is_success());
    assert_eq!(
        s.output.get_output(),
        "E121: Undefined variable: undefined_thing\nfinally\n\n"
    );
}

#[test]
fn unmatched_catch_runs_finally_and_propagates() {
    let mut s = Session::new();
    let result = s.run(vec![try_catch(
        vec![stmt(StmtKind::Throw(Expr::string("oops")))],
        Some("E121"),
        vec![echo(vec![Expr::string("caught")])],
    )]);
    let err = result.error().unwrap();
    assert!(err.is_thrown());
    assert_eq!(err.message, "oops");
    assert_eq!(s.output.get_output(), "finally\n");
}

#[test]
fn thrown_values_are_caught_by_text() {
    let mut s = Session::new();
    s.run(vec![try_catch(
        vec![stmt(StmtKind::Throw(Expr::string("oops")))],
        Some("^oops$"),
        vec![echo(vec![Expr::string("caught")])],
    )]);
    assert_eq!(s.output.get_output(), "caught\nfinally\n");
}

#[test]
fn vim_prefix_cannot_be_thrown() {
    let mut s = Session::new();
    let code = s.error_code(vec![stmt(StmtKind::Throw(Expr::string("Vim:boom")))]);
    assert_eq!(code, "E608");
}

#[test]
fn finish_runs_finally_and_skips_catch() {
    let mut s = Session::new();
    s.source(
        "guarded.vim",
        vec![
            try_catch(
                vec![stmt(StmtKind::Finish)],
                None,
                vec![echo(vec![Expr::string("caught")])],
            ),
            echo(vec![Expr::string("after")]),
        ],
    );
    assert_eq!(s.output.get_output(), "finally\n");
    assert!(s.output.errors().is_empty());
}

// Top level

#[test]
fn return_outside_function() {
    let mut s = Session::new();
    assert_eq!(s.error_code(vec![ret(Expr::Number(1))]), "E133");
}

#[test]
fn sourcing_reports_errors_and_continues() {
    let mut s = Session::new();
    s.source(
        "plugin.vim",
        vec![
            stmt(StmtKind::Break),
            echo(vec![var("missing")]),
            echo(vec![Expr::string("still running")]),
        ],
    );
    assert_eq!(
        s.output.errors(),
        vec![
            "E587: :break without :while or :for",
            "E121: Undefined variable: missing",
        ]
    );
    assert!(s.output.get_output().ends_with("still running\n"));
    assert!(s.interp.take_error_flag());
    assert!(!s.interp.take_error_flag());
    assert_eq!(
        s.interp.vim_var("errmsg"),
        Some(Value::string("E121: Undefined variable: missing"))
    );
}

#[test]
fn finish_stops_the_script() {
    let mut s = Session::new();
    s.source(
        "short.vim",
        vec![
            echo(vec![Expr::string("before")]),
            stmt(StmtKind::Finish),
            echo(vec![Expr::string("after")]),
        ],
    );
    assert_eq!(s.output.get_output(), "before\n");
}

// Functions

#[test]
fn redeclaring_needs_bang() {
    let mut s = Session::new();
    let decl = || FunctionDecl::new("Twice", &[], vec![ret(Expr::Number(1))]);
    assert!(s.run(vec![function(decl())]).is_success());
    assert_eq!(s.error_code(vec![function(decl())]), "E122");
    assert!(s.run(vec![function(decl().replacing())]).is_success());
    assert_eq!(s.interp.function_names(), vec!["Twice".to_string()]);
}

#[test]
fn lowercase_global_function_is_rejected() {
    let mut s = Session::new();
    let code = s.error_code(vec![function(FunctionDecl::new("lower", &[], Vec::new()))]);
    assert_eq!(code, "E128");
}

#[test]
fn closure_needs_an_enclosing_function() {
    let mut s = Session::new();
    let decl = FunctionDecl::new("Inner", &[], Vec::new()).with_flags(FunctionFlags::CLOSURE);
    assert_eq!(s.error_code(vec![function(decl)]), "E932");
}

#[test]
fn delfunction() {
    let mut s = Session::new();
    let del = |force| {
        stmt(StmtKind::DelFunction {
            target: FunctionTarget::Named(VarRef::parse("Gone")),
            force,
        })
    };
    assert_eq!(s.error_code(vec![del(false)]), "E130");
    assert!(s.run(vec![del(true)]).is_success());
    s.run(vec![function(FunctionDecl::new("Gone", &[], Vec::new()))]);
    assert!(s.run(vec![del(false)]).is_success());
    assert!(s.interp.function("Gone").is_none());
}

#[test]
fn arguments_and_varargs() {
    let mut s = Session::new();
    let body = vec![ret(Expr::List(vec![
        Expr::Var(VarRef::parse("a:x")),
        Expr::Var(VarRef::parse("a:0")),
        Expr::Var(VarRef::parse("a:000")),
    ]))];
    let decl = FunctionDecl::new("Args", &["x"], body).with_varargs();
    s.run(vec![
        function(decl),
        let_(
            "r",
            Expr::call(
                "Args",
                vec![Expr::Number(1), Expr::Number(2), Expr::Number(3)],
            ),
        ),
    ]);
    assert_eq!(s.global("r").to_string_repr(), "[1, 2, [2, 3]]");
    assert_eq!(
        s.error_code(vec![call("Args", Vec::new())]),
        "E119"
    );
}

#[test]
fn dict_functions_bind_self() {
    let mut s = Session::new();
    let decl = FunctionDecl {
        target: FunctionTarget::DictMember {
            dict: var("obj"),
            key: "get".to_string(),
        },
        ..FunctionDecl::new("unused", &[], vec![ret(Expr::dict_key(var("self"), "value"))])
    };
    s.run(vec![
        let_("obj", Expr::Dict(vec![(Expr::string("value"), Expr::Number(42))])),
        function(decl.clone()),
        let_(
            "r",
            Expr::call_value(Expr::dict_key(var("obj"), "get"), Vec::new()),
        ),
    ]);
    assert_eq!(s.global("r"), Value::Number(42));
    assert_eq!(s.error_code(vec![function(decl)]), "E737");
}

#[test]
fn recursion_depth_is_limited() {
    let output = buffer_handler();
    let mut interp = Interpreter::builder()
        .output(Arc::clone(&output))
        .max_function_depth(10)
        .build();
    let decl = FunctionDecl::new("Deep", &[], vec![ret(Expr::call("Deep", Vec::new()))])
        .with_flags(FunctionFlags::ABORT);
    let stmts = vec![function(decl), call("Deep", Vec::new())];
    let result = interp.execute(&stmts, &mut MemoryEditor::new());
    assert_eq!(result.error().unwrap().code(), Some("E132"));
}
