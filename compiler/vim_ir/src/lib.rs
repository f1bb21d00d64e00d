//! Vim IR - syntax tree types consumed by the evaluator.
//!
//! The tree is produced by an external parser and handed to `vim_eval`
//! as immutable input. This crate contains:
//! - [`Span`]: the source line a statement came from (used for throwpoints)
//! - Expressions ([`Expr`]) and their operators
//! - Statements ([`Stmt`]) and assignment targets ([`LetTarget`])
//! - Function declarations ([`FunctionDecl`]) and lambda literals
//!
//! Trees are plain owned data. Function bodies are held in `Rc<[Stmt]>` so a
//! declaration can be shared between the function registry and every funcref
//! or lambda created from it without cloning statements.

pub mod ast;
mod span;

pub use ast::{
    AssignOp, BinaryOp, CaseMode, CatchClause, Callee, CompareOp, EchoKind, Expr, FunctionDecl,
    FunctionFlags, FunctionTarget, IfBranch, LambdaExpr, LetTarget, LineAddress, LineRange,
    OptionScope, Param, Script, Stmt, StmtKind, UnaryOp, VarRef, VarScope, LOCK_DEPTH_DEFAULT,
    LOCK_DEPTH_FULL,
};
pub use span::Span;
