//! RAII guard for user function frames.
//!
//! [`ScopedCall`] owns the interpreter for the duration of one user function
//! call. Dropping it pops the environment frame and the call-stack entry, so
//! every exit path out of a function body (return, error, `:finish`, panic)
//! leaves both stacks balanced.

use std::ops::{Deref, DerefMut};

use vim_value::{ActiveCall, EvalError};

use super::Interpreter;
use crate::diagnostics::CallFrame;
use crate::environment::Frame;

/// Access the interpreter through this guard; it implements `Deref` and
/// `DerefMut`.
pub(crate) struct ScopedCall<'guard> {
    interpreter: &'guard mut Interpreter,
    _active: ActiveCall,
}

impl Drop for ScopedCall<'_> {
    fn drop(&mut self) {
        self.interpreter.env.pop_frame();
        self.interpreter.call_stack.pop();
    }
}

impl Deref for ScopedCall<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for ScopedCall<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl Interpreter {
    /// Push `frame` for a call of its function.
    ///
    /// Fails with `E132` when the call would exceed `'maxfuncdepth'`; nothing
    /// is pushed in that case.
    pub(crate) fn enter_call(&mut self, frame: Frame) -> Result<ScopedCall<'_>, EvalError> {
        self.call_stack
            .push(CallFrame::new(frame.function.name.clone()))?;
        let active = frame.function.enter();
        self.env.push_frame(frame);
        Ok(ScopedCall {
            interpreter: self,
            _active: active,
        })
    }
}
