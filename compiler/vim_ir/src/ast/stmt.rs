//! Statements.

use std::fmt;
use std::rc::Rc;

use super::expr::{Expr, OptionScope, VarRef};
use super::function::{FunctionDecl, FunctionTarget};
use super::operators::AssignOp;
use crate::Span;

/// Depth used by `:lockvar` and `:unlockvar` without an explicit count.
pub const LOCK_DEPTH_DEFAULT: u32 = 2;

/// Depth used by `:lockvar!`: the whole structure.
pub const LOCK_DEPTH_FULL: u32 = u32::MAX;

/// Statement node.
#[derive(Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    /// Statement with no source position.
    pub fn generated(kind: StmtKind) -> Self {
        Stmt::new(kind, Span::DUMMY)
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Left-hand side of `:let`, `:unlet` and `:lockvar`.
#[derive(Clone, PartialEq, Debug)]
pub enum LetTarget {
    Var(VarRef),
    Option { name: String, scope: OptionScope },
    Register(char),
    Env(String),
    /// `base[index]`
    Index { base: Expr, index: Expr },
    /// `base[from : to]`
    Sublist {
        base: Expr,
        from: Option<Expr>,
        to: Option<Expr>,
    },
    /// `base.key`
    DictKey { base: Expr, key: String },
    /// `[a, b; rest]`
    Unpack {
        targets: Vec<LetTarget>,
        rest: Option<Box<LetTarget>>,
    },
}

impl LetTarget {
    pub fn var(name: &str) -> Self {
        LetTarget::Var(VarRef::parse(name))
    }
}

/// Which echo command produced an [`StmtKind::Echo`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum EchoKind {
    /// `:echo`: space separated, own line.
    Echo,
    /// `:echon`: no separator, no newline.
    Echon,
    /// `:echomsg`: like `:echo`, also kept in the message history.
    Msg,
    /// `:echoerr`: raises the text as an error.
    Err,
}

/// One address of a `:call` range.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LineAddress {
    /// `.`
    Current,
    /// `$`
    Last,
    Number(usize),
}

/// `:{start},{end}call`
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LineRange {
    pub start: LineAddress,
    pub end: LineAddress,
}

/// `:if`/`:elseif` arm.
#[derive(Clone, PartialEq, Debug)]
pub struct IfBranch {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

/// `:catch /pattern/`; no pattern catches everything.
#[derive(Clone, PartialEq, Debug)]
pub struct CatchClause {
    pub pattern: Option<String>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Statement kinds.
#[derive(Clone, PartialEq, Debug)]
pub enum StmtKind {
    /// `:let`, `:const`
    Let {
        target: LetTarget,
        op: AssignOp,
        value: Expr,
        is_const: bool,
    },
    /// `:unlet[!]`
    Unlet { targets: Vec<LetTarget>, force: bool },
    /// `:lockvar` / `:unlockvar`
    LockVar {
        targets: Vec<LetTarget>,
        depth: u32,
        unlock: bool,
    },
    Echo { kind: EchoKind, args: Vec<Expr> },
    /// `:call`; the expression is a call or method call.
    Call {
        expr: Expr,
        range: Option<LineRange>,
    },
    If {
        branches: Vec<IfBranch>,
        else_body: Option<Vec<Stmt>>,
    },
    While { condition: Expr, body: Vec<Stmt> },
    For {
        target: VarRef,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    /// `:for [a, b] in list`
    ForUnpack {
        targets: Vec<VarRef>,
        iterable: Expr,
        body: Vec<Stmt>,
    },
    Try {
        body: Vec<Stmt>,
        catches: Vec<CatchClause>,
        finally: Option<Vec<Stmt>>,
    },
    Throw(Expr),
    Function(Rc<FunctionDecl>),
    /// `:delfunction[!]`
    DelFunction { target: FunctionTarget, force: bool },
    Return(Option<Expr>),
    Break,
    Continue,
    Finish,
}

/// A sourced file: its name (used for `s:` and throwpoints) and body.
#[derive(Clone, PartialEq, Debug)]
pub struct Script {
    pub name: String,
    pub body: Vec<Stmt>,
}

impl Script {
    pub fn new(name: impl Into<String>, body: Vec<Stmt>) -> Self {
        Script {
            name: name.into(),
            body,
        }
    }
}
