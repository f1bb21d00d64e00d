//! Variable scopes.
//!
//! Every scope is a dictionary: `g:` and `v:` live for the whole session,
//! each sourced script has its own `s:`, and each user function call pushes a
//! [`Frame`] holding that call's `l:` and `a:`. Frames form a stack (not
//! cloned environments), so returning from a call is a pop.
//!
//! `b:`, `w:` and `t:` belong to the editor and are not stored here.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use vim_ir::VarScope;
use vim_value::{ClosureScope, DictHandle, ScriptId, UserFunction, Value, ValueType};

/// `v:` variables a script may assign.
const WRITABLE_VIM_VARS: [&str; 2] = ["errmsg", "count"];

/// `v:` variables that are also visible without the prefix.
const COMPAT_VIM_VARS: [&str; 4] = ["count", "errmsg", "shell_error", "version"];

/// `v:version` reported to scripts.
pub const VIM_VERSION: i64 = 900;

/// Scopes of one active user function call.
#[derive(Clone, Debug)]
pub struct Frame {
    pub function: Rc<UserFunction>,
    /// `l:`
    pub locals: DictHandle,
    /// `a:`
    pub args: DictHandle,
}

impl Frame {
    pub fn new(function: Rc<UserFunction>) -> Self {
        Frame {
            function,
            locals: DictHandle::new(),
            args: DictHandle::new(),
        }
    }

    /// Scopes a lambda or closure created in this frame sees.
    pub fn capture(&self) -> Rc<ClosureScope> {
        Rc::new(ClosureScope {
            locals: self.locals.clone(),
            args: self.args.clone(),
            parent: self.function.closure.clone(),
        })
    }
}

/// Where an unscoped or scoped name lives.
#[derive(Clone, Debug)]
pub enum ScopeLookup {
    /// A dictionary owned by the interpreter.
    Dict(DictHandle),
    /// `l:` or `a:` used outside a function.
    NoFunction,
    /// `b:`, `w:` or `t:`: ask the editor.
    Host,
}

/// Interpreter-owned variable store.
pub struct Environment {
    globals: DictHandle,
    vim_vars: DictHandle,
    script_vars: FxHashMap<ScriptId, DictHandle>,
    /// Script executing at top level.
    script: ScriptId,
    frames: Vec<Frame>,
}

impl Environment {
    pub fn new() -> Self {
        let mut script_vars = FxHashMap::default();
        script_vars.insert(ScriptId::default(), DictHandle::new());
        Environment {
            globals: DictHandle::new(),
            vim_vars: predefined_vim_vars(),
            script_vars,
            script: ScriptId::default(),
            frames: Vec::new(),
        }
    }

    /// `g:`
    pub fn globals(&self) -> &DictHandle {
        &self.globals
    }

    /// `v:`
    pub fn vim_vars(&self) -> &DictHandle {
        &self.vim_vars
    }

    /// Script whose `s:` is in effect: the running function's, or the
    /// top-level one.
    pub fn current_script(&self) -> ScriptId {
        self.frames
            .last()
            .map_or(self.script, |frame| frame.function.script)
    }

    /// Switch the top-level script, returning the previous one.
    pub fn enter_script(&mut self, script: ScriptId) -> ScriptId {
        self.script_vars.entry(script).or_default();
        std::mem::replace(&mut self.script, script)
    }

    /// `s:` of `script`.
    pub fn script_vars(&mut self, script: ScriptId) -> DictHandle {
        self.script_vars.entry(script).or_default().clone()
    }

    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Innermost active call, `None` at top level.
    pub fn frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    #[inline]
    pub fn in_function(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Scopes for a lambda or closure created now.
    pub fn capture(&self) -> Option<Rc<ClosureScope>> {
        self.frame().map(Frame::capture)
    }

    /// Dictionary behind an explicit scope prefix.
    pub fn scope(&mut self, scope: VarScope) -> ScopeLookup {
        match scope {
            VarScope::Global => ScopeLookup::Dict(self.globals.clone()),
            VarScope::Vim => ScopeLookup::Dict(self.vim_vars.clone()),
            VarScope::Script => ScopeLookup::Dict(self.script_vars(self.current_script())),
            VarScope::Local => self
                .frame()
                .map_or(ScopeLookup::NoFunction, |f| ScopeLookup::Dict(f.locals.clone())),
            VarScope::Argument => self
                .frame()
                .map_or(ScopeLookup::NoFunction, |f| ScopeLookup::Dict(f.args.clone())),
            VarScope::Buffer | VarScope::Window | VarScope::Tab => ScopeLookup::Host,
        }
    }

    /// Read an unscoped name.
    ///
    /// Inside a function: `l:`, a lambda's own arguments, then the scopes it
    /// captured. At top level: `g:`. Either way the few `v:` names that
    /// predate the prefix are found last.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let found = match self.frame() {
            Some(frame) => frame
                .locals
                .get(name)
                .or_else(|| {
                    frame
                        .function
                        .is_lambda()
                        .then(|| frame.args.get(name))
                        .flatten()
                })
                .or_else(|| lookup_closure(frame.function.closure.as_ref(), name)),
            None => self.globals.get(name),
        };
        found.or_else(|| {
            COMPAT_VIM_VARS
                .contains(&name)
                .then(|| self.vim_vars.get(name))
                .flatten()
        })
    }

    /// Dictionary an unscoped assignment writes to.
    ///
    /// A closure assigning to a name that exists in a captured scope writes
    /// there; anything else goes to `l:` in a function and `g:` outside.
    pub fn assign_target(&self, name: &str) -> DictHandle {
        let Some(frame) = self.frame() else {
            return self.globals.clone();
        };
        if frame.locals.contains_key(name) {
            return frame.locals.clone();
        }
        let mut scope = frame.function.closure.as_ref();
        while let Some(closure) = scope {
            if closure.locals.contains_key(name) {
                return closure.locals.clone();
            }
            scope = closure.parent.as_ref();
        }
        frame.locals.clone()
    }

    /// Whether a script may assign `v:{name}`.
    pub fn is_writable_vim_var(name: &str) -> bool {
        WRITABLE_VIM_VARS.contains(&name)
    }

    /// Set a `v:` variable from inside the runtime.
    pub fn set_vim_var(&self, name: &str, value: Value) {
        self.vim_vars.define(name, value);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup_closure(mut scope: Option<&Rc<ClosureScope>>, name: &str) -> Option<Value> {
    while let Some(closure) = scope {
        if let Some(value) = closure.locals.get(name).or_else(|| closure.args.get(name)) {
            return Some(value);
        }
        scope = closure.parent.as_ref();
    }
    None
}

fn predefined_vim_vars() -> DictHandle {
    let types = [
        ("t_number", ValueType::Number),
        ("t_string", ValueType::String),
        ("t_func", ValueType::Funcref),
        ("t_list", ValueType::List),
        ("t_dict", ValueType::Dict),
        ("t_float", ValueType::Float),
        ("t_blob", ValueType::Blob),
    ];
    let vars = DictHandle::from_entries(
        types
            .into_iter()
            .map(|(name, ty)| (name.to_string(), Value::Number(ty.code()))),
    );
    for (name, value) in [
        ("count", Value::Number(0)),
        ("errmsg", Value::empty_string()),
        ("exception", Value::empty_string()),
        ("throwpoint", Value::empty_string()),
        ("shell_error", Value::Number(0)),
        ("version", Value::Number(VIM_VERSION)),
        ("numbermax", Value::Number(i64::MAX)),
        ("numbermin", Value::Number(i64::MIN)),
        ("numbersize", Value::Number(64)),
        ("key", Value::empty_string()),
        ("val", Value::empty_string()),
    ] {
        vars.define(name, value);
    }
    vars
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
