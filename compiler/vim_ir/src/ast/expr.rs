//! Expressions.

use std::fmt;
use std::rc::Rc;

use super::function::{FunctionDecl, FunctionFlags, FunctionTarget, Param};
use super::operators::{BinaryOp, UnaryOp};
use super::stmt::{Stmt, StmtKind};
use crate::Span;

/// Variable namespace prefix (`g:`, `s:`, `l:`, ...).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VarScope {
    Global,
    Script,
    Local,
    Argument,
    Vim,
    Buffer,
    Window,
    Tab,
}

impl VarScope {
    pub const ALL: [VarScope; 8] = [
        VarScope::Global,
        VarScope::Script,
        VarScope::Local,
        VarScope::Argument,
        VarScope::Vim,
        VarScope::Buffer,
        VarScope::Window,
        VarScope::Tab,
    ];

    pub const fn prefix(self) -> char {
        match self {
            VarScope::Global => 'g',
            VarScope::Script => 's',
            VarScope::Local => 'l',
            VarScope::Argument => 'a',
            VarScope::Vim => 'v',
            VarScope::Buffer => 'b',
            VarScope::Window => 'w',
            VarScope::Tab => 't',
        }
    }

    pub fn from_prefix(c: char) -> Option<Self> {
        VarScope::ALL.into_iter().find(|scope| scope.prefix() == c)
    }
}

impl fmt::Display for VarScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.prefix())
    }
}

/// A possibly scoped variable name: `x`, `g:x`, `a:000`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VarRef {
    pub scope: Option<VarScope>,
    pub name: String,
}

impl VarRef {
    pub fn new(scope: Option<VarScope>, name: impl Into<String>) -> Self {
        VarRef {
            scope,
            name: name.into(),
        }
    }

    pub fn unscoped(name: impl Into<String>) -> Self {
        VarRef::new(None, name)
    }

    pub fn scoped(scope: VarScope, name: impl Into<String>) -> Self {
        VarRef::new(Some(scope), name)
    }

    /// Split `g:name` style text into scope and name.
    ///
    /// Text without a recognised single-letter prefix is unscoped.
    pub fn parse(text: &str) -> Self {
        let mut chars = text.chars();
        if let (Some(c), Some(':')) = (chars.next(), chars.next()) {
            if let Some(scope) = VarScope::from_prefix(c) {
                return VarRef::scoped(scope, &text[2..]);
            }
        }
        VarRef::unscoped(text)
    }
}

impl fmt::Display for VarRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(scope) => write!(f, "{scope}{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Which option value `&name`, `&g:name` or `&l:name` refers to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum OptionScope {
    #[default]
    Effective,
    Global,
    Local,
}

impl OptionScope {
    pub const fn prefix(self) -> &'static str {
        match self {
            OptionScope::Effective => "",
            OptionScope::Global => "g:",
            OptionScope::Local => "l:",
        }
    }
}

/// What a call expression invokes.
#[derive(Clone, PartialEq, Debug)]
pub enum Callee {
    /// `Foo(...)`, `s:Helper(...)`, `len(...)`: resolved by name, or through
    /// a variable of that name holding a Funcref.
    Named(VarRef),
    /// Anything else that evaluates to a Funcref: `d.method(...)`,
    /// `list[0](...)`, `{x -> x}(...)`.
    Expr(Box<Expr>),
}

/// Lambda literal `{a, b -> expr}`.
///
/// The body is wrapped into a one-statement declaration when the literal is
/// built, so every evaluation of the literal shares it.
#[derive(Clone, PartialEq, Debug)]
pub struct LambdaExpr {
    pub decl: Rc<FunctionDecl>,
}

impl LambdaExpr {
    pub fn new(params: Vec<String>, varargs: bool, body: Expr) -> Self {
        let body: Rc<[Stmt]> = Rc::from(vec![Stmt::new(
            StmtKind::Return(Some(body)),
            Span::DUMMY,
        )]);
        let decl = FunctionDecl {
            target: FunctionTarget::Named(VarRef::unscoped("<lambda>")),
            params: params.into_iter().map(Param::required).collect(),
            varargs,
            flags: FunctionFlags::CLOSURE,
            body,
            replace: false,
            span: Span::DUMMY,
        };
        LambdaExpr {
            decl: Rc::new(decl),
        }
    }
}

/// Expression node.
#[derive(Clone, PartialEq, Debug)]
pub enum Expr {
    Number(i64),
    Float(f64),
    String(String),
    List(Vec<Expr>),
    /// `{key: value}`; keys are arbitrary expressions coerced to strings.
    Dict(Vec<(Expr, Expr)>),
    Var(VarRef),
    /// A bare scope used as a dictionary: `g:`, `l:`, `a:`.
    ScopeDict(VarScope),
    /// `&name`
    Option {
        name: String,
        scope: OptionScope,
    },
    /// `@r`
    Register(char),
    /// `$NAME`
    Env(String),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    /// `cond ? a : b`
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// `a ?? b`
    Falsy {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `base[index]`
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    /// `base[from : to]`, both bounds inclusive and optional.
    Sublist {
        base: Box<Expr>,
        from: Option<Box<Expr>>,
        to: Option<Box<Expr>>,
    },
    /// `base.key`
    DictKey {
        base: Box<Expr>,
        key: String,
    },
    Call {
        callee: Callee,
        args: Vec<Expr>,
    },
    /// `receiver->callee(args)`: the receiver becomes the first argument.
    MethodCall {
        receiver: Box<Expr>,
        callee: Callee,
        args: Vec<Expr>,
    },
    Lambda(LambdaExpr),
}

impl Expr {
    pub fn string(text: impl Into<String>) -> Self {
        Expr::String(text.into())
    }

    pub fn var(name: &str) -> Self {
        Expr::Var(VarRef::parse(name))
    }

    pub fn binary(left: Expr, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn index(base: Expr, index: Expr) -> Self {
        Expr::Index {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    pub fn sublist(base: Expr, from: Option<Expr>, to: Option<Expr>) -> Self {
        Expr::Sublist {
            base: Box::new(base),
            from: from.map(Box::new),
            to: to.map(Box::new),
        }
    }

    pub fn dict_key(base: Expr, key: impl Into<String>) -> Self {
        Expr::DictKey {
            base: Box::new(base),
            key: key.into(),
        }
    }

    /// Call by name: `Expr::call("len", vec![...])`.
    pub fn call(name: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Callee::Named(VarRef::parse(name)),
            args,
        }
    }

    /// Call whatever `callee` evaluates to.
    pub fn call_value(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Callee::Expr(Box::new(callee)),
            args,
        }
    }

    pub fn method(receiver: Expr, name: &str, args: Vec<Expr>) -> Self {
        Expr::MethodCall {
            receiver: Box::new(receiver),
            callee: Callee::Named(VarRef::parse(name)),
            args,
        }
    }

    pub fn lambda(params: &[&str], body: Expr) -> Self {
        Expr::Lambda(LambdaExpr::new(
            params.iter().map(|p| (*p).to_string()).collect(),
            false,
            body,
        ))
    }
}
