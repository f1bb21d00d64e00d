//! Runtime values for the Vim script runtime.
//!
//! - [`Value`]: the seven value kinds (Number, Float, String, List,
//!   Dictionary, Funcref, Blob) with Vim's coercion rules
//! - [`ListHandle`] / [`DictHandle`]: shared, lockable containers
//! - [`FuncrefValue`] and [`UserFunction`]: callable references
//! - [`EvalError`] / [`ControlAction`]: the error channel, with Vim's
//!   numbered messages (`E121: Undefined variable: x`)
//! - [`number`]: Vim's string-to-number and float formatting rules

pub mod errors;
pub mod number;
mod value;

pub use errors::{ControlAction, EvalError, EvalErrorKind, EvalResult};
pub use value::{
    resolve_index, ActiveCall, ClosureScope, DictHandle, FuncrefKind, FuncrefValue,
    FunctionHandle, ListHandle, ScriptId, UserFunction, Value, ValueType,
};
