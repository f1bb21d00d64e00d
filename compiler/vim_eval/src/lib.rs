//! Vim Eval - tree-walking interpreter for Vim script.
//!
//! Executes syntax trees from `vim_ir` against a host editor.
//!
//! # Architecture
//!
//! The evaluator uses:
//! - [`Interpreter`]: statement execution, expression evaluation and calls
//! - [`Environment`]: `g:`, `v:`, `s:` dictionaries and a stack of call frames
//! - [`FunctionRegistry`]: declared user functions by name
//! - `evaluate_binary` / `evaluate_unary`: direct enum dispatch over operators
//! - a table of builtin functions (`len()`, `map()`, `function()`, ...)
//! - [`EditorContext`]: buffer lines, options, registers and `b:`/`w:`/`t:`
//!   supplied by the host
//!
//! Values, containers and error types come from `vim_value` and are
//! re-exported here.
//!
//! # Tracing
//!
//! Calls, script runs and reported errors emit `tracing` events. Call
//! [`init_tracing`] and set `RUST_LOG=vim_eval=debug` to see them.

mod builtins;
pub mod collaborators;
pub mod config;
pub mod diagnostics;
mod environment;
pub mod errors;
mod functions;
pub mod host;
mod indexing;
pub mod interpreter;
mod operators;
mod output;
mod unary_operators;

use std::sync::Once;

pub use vim_value::{
    ControlAction, DictHandle, EvalError, EvalErrorKind, EvalResult, FuncrefKind, FuncrefValue,
    FunctionHandle, ListHandle, ScriptId, UserFunction, Value, ValueType,
};

pub use builtins::{builtin_names, is_builtin};
pub use collaborators::{ExpressionParser, PatternMatcher, SubstringMatcher};
pub use config::InterpreterConfig;
pub use environment::{Environment, Frame, ScopeLookup, VIM_VERSION};
pub use functions::FunctionRegistry;
pub use host::{EditorContext, HostScope, MemoryEditor};
pub use indexing::{index_value, slice_value};
pub use interpreter::{CallTarget, ExecutionResult, Interpreter, InterpreterBuilder};
pub use operators::{compare, evaluate_binary, values_equal};
pub use output::{
    buffer_handler, silent_handler, stdout_handler, BufferOutput, OutputHandler,
    SharedOutputHandler, StdoutOutput,
};
pub use unary_operators::evaluate_unary;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
