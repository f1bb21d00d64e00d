//! `:function` declarations.

use std::rc::Rc;

use bitflags::bitflags;

use super::expr::{Expr, VarRef};
use super::stmt::Stmt;
use crate::Span;

bitflags! {
    /// Attributes written after the parameter list.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FunctionFlags: u8 {
        /// Stop at the first error and return it to the caller.
        const ABORT = 1 << 0;
        /// Called once for a line range instead of once per line.
        const RANGE = 1 << 1;
        /// Must be called with a dictionary bound to `self`.
        const DICT = 1 << 2;
        /// Captures the scopes of the enclosing function.
        const CLOSURE = 1 << 3;
    }
}

/// Where a declaration is stored.
#[derive(Clone, PartialEq, Debug)]
pub enum FunctionTarget {
    /// `function Name()`, `function g:Name()`, `function s:name()`.
    Named(VarRef),
    /// `function dict.key()`: an anonymous function stored as a Funcref in
    /// the dictionary `dict` evaluates to.
    DictMember { dict: Expr, key: String },
}

/// A formal parameter, optionally with a default (`name = expr`).
#[derive(Clone, PartialEq, Debug)]
pub struct Param {
    pub name: String,
    pub default: Option<Expr>,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Param {
            name: name.into(),
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, default: Expr) -> Self {
        Param {
            name: name.into(),
            default: Some(default),
        }
    }
}

/// A parsed `:function ... :endfunction` block.
#[derive(Clone, PartialEq, Debug)]
pub struct FunctionDecl {
    pub target: FunctionTarget,
    pub params: Vec<Param>,
    /// Trailing `...` in the parameter list.
    pub varargs: bool,
    pub flags: FunctionFlags,
    pub body: Rc<[Stmt]>,
    /// Declared with `function!`.
    pub replace: bool,
    pub span: Span,
}

impl FunctionDecl {
    /// A plain `function Name(params)` declaration with no flags.
    pub fn new(name: &str, params: &[&str], body: Vec<Stmt>) -> Self {
        FunctionDecl {
            target: FunctionTarget::Named(VarRef::parse(name)),
            params: params.iter().map(|p| Param::required(*p)).collect(),
            varargs: false,
            flags: FunctionFlags::empty(),
            body: Rc::from(body),
            replace: false,
            span: Span::DUMMY,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: FunctionFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn with_varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    #[must_use]
    pub fn replacing(mut self) -> Self {
        self.replace = true;
        self
    }

    /// Number of parameters that have no default.
    pub fn required_params(&self) -> usize {
        self.params.iter().filter(|p| p.default.is_none()).count()
    }

    /// Upper bound on positional arguments, `None` with `...`.
    pub fn max_params(&self) -> Option<usize> {
        if self.varargs {
            None
        } else {
            Some(self.params.len())
        }
    }

    pub fn is_abort(&self) -> bool {
        self.flags.contains(FunctionFlags::ABORT)
    }
}
