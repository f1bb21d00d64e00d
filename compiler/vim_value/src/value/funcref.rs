//! Callable references.
//!
//! A [`FuncrefValue`] points at a [`FunctionHandle`] (a builtin name or a
//! user function), optionally with bound leading arguments and a bound
//! `self` dictionary (a partial). How the handle is resolved at call time
//! depends on its [`FuncrefKind`].

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use vim_ir::FunctionDecl;

use super::{DictHandle, Value};

/// Identifies a sourced script; selects its `s:` dictionary and `<SNR>`
/// function prefix.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ScriptId(pub u32);

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scopes captured by a closure or lambda: the creating function's `l:`
/// and `a:` dictionaries, chained to whatever that function captured.
#[derive(Debug)]
pub struct ClosureScope {
    pub locals: DictHandle,
    pub args: DictHandle,
    pub parent: Option<Rc<ClosureScope>>,
}

/// A declared function.
///
/// Shared between the registry and every funcref created for it, so a
/// funcref stays callable after the registry entry is replaced.
pub struct UserFunction {
    /// Registered name: `Foo`, `<SNR>1_helper`, `<lambda>3`, or a number
    /// for dictionary functions.
    pub name: String,
    pub decl: Rc<FunctionDecl>,
    /// Script whose `s:` scope the body sees.
    pub script: ScriptId,
    pub closure: Option<Rc<ClosureScope>>,
    deleted: Cell<bool>,
    active_calls: Cell<u32>,
}

impl UserFunction {
    pub fn new(
        name: impl Into<String>,
        decl: Rc<FunctionDecl>,
        script: ScriptId,
        closure: Option<Rc<ClosureScope>>,
    ) -> Self {
        UserFunction {
            name: name.into(),
            decl,
            script,
            closure,
            deleted: Cell::new(false),
            active_calls: Cell::new(0),
        }
    }

    pub fn is_lambda(&self) -> bool {
        self.name.starts_with("<lambda>")
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.get()
    }

    pub fn mark_deleted(&self) {
        self.deleted.set(true);
    }

    /// A call of this function is on the stack.
    pub fn is_active(&self) -> bool {
        self.active_calls.get() > 0
    }

    /// Count a call as active until the guard drops.
    pub fn enter(self: &Rc<Self>) -> ActiveCall {
        self.active_calls.set(self.active_calls.get() + 1);
        ActiveCall(Rc::clone(self))
    }
}

impl fmt::Debug for UserFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserFunction")
            .field("name", &self.name)
            .field("script", &self.script)
            .field("deleted", &self.deleted.get())
            .finish_non_exhaustive()
    }
}

/// Marks a [`UserFunction`] as running; see [`UserFunction::enter`].
#[must_use]
pub struct ActiveCall(Rc<UserFunction>);

impl Drop for ActiveCall {
    fn drop(&mut self) {
        let calls = &self.0.active_calls;
        calls.set(calls.get().saturating_sub(1));
    }
}

/// What a funcref calls.
#[derive(Clone, Debug)]
pub enum FunctionHandle {
    /// A builtin, by name.
    Builtin(&'static str),
    User(Rc<UserFunction>),
}

impl FunctionHandle {
    pub fn name(&self) -> &str {
        match self {
            FunctionHandle::Builtin(name) => name,
            FunctionHandle::User(function) => &function.name,
        }
    }

    pub fn same_target(&self, other: &FunctionHandle) -> bool {
        match (self, other) {
            (FunctionHandle::Builtin(a), FunctionHandle::Builtin(b)) => a == b,
            (FunctionHandle::User(a), FunctionHandle::User(b)) => {
                Rc::ptr_eq(a, b) || a.name == b.name
            }
            _ => false,
        }
    }
}

/// How a funcref finds its function when called.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FuncrefKind {
    /// A lambda literal; calls the captured declaration.
    Lambda,
    /// `funcref()`: keeps calling the declaration it was created from.
    Funcref,
    /// `function()` and dictionary functions: looks the name up again on
    /// every call, so redefining the function changes what it calls.
    Function,
}

/// A Funcref value.
#[derive(Clone, Debug)]
pub struct FuncrefValue {
    pub handle: FunctionHandle,
    /// Arguments placed before the call's own arguments.
    pub arguments: Vec<Value>,
    /// Dictionary bound to `self`.
    pub dict: Option<DictHandle>,
    pub kind: FuncrefKind,
}

impl FuncrefValue {
    pub fn new(handle: FunctionHandle, kind: FuncrefKind) -> Self {
        FuncrefValue {
            handle,
            arguments: Vec::new(),
            dict: None,
            kind,
        }
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    /// Has bound arguments or a bound dictionary.
    pub fn is_partial(&self) -> bool {
        !self.arguments.is_empty() || self.dict.is_some()
    }

    /// Copy with `dict` bound to `self`, as happens when a funcref is read
    /// out of a dictionary.
    #[must_use]
    pub fn bind_dict(&self, dict: DictHandle) -> FuncrefValue {
        FuncrefValue {
            dict: Some(dict),
            ..self.clone()
        }
    }
}

impl PartialEq for FuncrefValue {
    fn eq(&self, other: &Self) -> bool {
        let same_dict = match (&self.dict, &other.dict) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        self.handle.same_target(&other.handle) && same_dict && self.arguments == other.arguments
    }
}
