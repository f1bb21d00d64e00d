//! Syntax tree nodes.
//!
//! - [`operators`]: binary, unary and compound-assignment operators
//! - [`expr`]: expressions, variable references and lambdas
//! - [`stmt`]: statements and assignment targets
//! - [`function`]: `:function` declarations

mod expr;
mod function;
mod operators;
mod stmt;

pub use expr::{Callee, Expr, LambdaExpr, OptionScope, VarRef, VarScope};
pub use function::{FunctionDecl, FunctionFlags, FunctionTarget, Param};
pub use operators::{AssignOp, BinaryOp, CaseMode, CompareOp, UnaryOp};
pub use stmt::{
    CatchClause, EchoKind, IfBranch, LetTarget, LineAddress, LineRange, Script, Stmt, StmtKind,
    LOCK_DEPTH_DEFAULT, LOCK_DEPTH_FULL,
};

#[cfg(test)]
mod tests;
