//! Call stack tracking.
//!
//! - `CallStack`: live user-function frames, enforcing `'maxfuncdepth'`
//! - `CallFrame`: the function name and the line currently executing in it
//!
//! The stack also renders `v:throwpoint` text, which names every active
//! function with the line it was at: `function Outer[2]..Inner, line 3`.

use vim_ir::Span;
use vim_value::errors::call_depth_exceeded;
use vim_value::EvalError;

/// One active user function call.
#[derive(Clone, Debug)]
pub struct CallFrame {
    pub name: String,
    /// Line of the statement executing in this frame (0 before the first).
    pub line: u32,
}

impl CallFrame {
    pub fn new(name: impl Into<String>) -> Self {
        CallFrame {
            name: name.into(),
            line: 0,
        }
    }
}

/// Live call stack of user functions.
#[derive(Clone, Debug)]
pub struct CallStack {
    frames: Vec<CallFrame>,
    max_depth: Option<usize>,
}

impl CallStack {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, failing with `E132` once the limit is reached.
    ///
    /// The frame is not pushed on failure.
    pub fn push(&mut self, frame: CallFrame) -> Result<(), EvalError> {
        if let Some(max) = self.max_depth {
            if self.frames.len() >= max {
                return Err(call_depth_exceeded(max));
            }
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Record the statement now executing in the innermost frame.
    pub fn set_line(&mut self, span: Span) {
        if span.is_dummy() {
            return;
        }
        if let Some(frame) = self.frames.last_mut() {
            frame.line = span.line;
        }
    }

    pub fn current(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    /// `v:throwpoint` text for an error raised now.
    ///
    /// At script level this is `{script}, line {n}`.
    pub fn throwpoint(&self, script: &str, script_line: u32) -> String {
        let Some((innermost, callers)) = self.frames.split_last() else {
            return format!("{script}, line {script_line}");
        };
        let mut text = String::from("function ");
        for frame in callers {
            text.push_str(&frame.name);
            text.push('[');
            text.push_str(&frame.line.to_string());
            text.push_str("]..");
        }
        text.push_str(&innermost.name);
        text.push_str(", line ");
        text.push_str(&innermost.line.to_string());
        text
    }
}
